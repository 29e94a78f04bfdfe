#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use facelapse_image as image;

#[doc(inline)]
pub use facelapse_imgproc as imgproc;

#[doc(inline)]
pub use facelapse_linalg as linalg;

#[doc(inline)]
pub use facelapse_face as face;

#[doc(inline)]
pub use facelapse_morph as morph;

#[doc(inline)]
pub use facelapse_io as io;
