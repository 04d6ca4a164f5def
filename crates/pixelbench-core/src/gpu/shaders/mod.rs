//! WGSL shader sources embedded at compile time.

/// Container for all shader source code.
pub struct Shaders;

impl Shaders {
    /// Multi-channel to luminance reduction.
    pub const GRAYSCALE: &'static str = include_str!("grayscale.wgsl");

    /// Sobel gradient magnitude edge detection.
    pub const SOBEL: &'static str = include_str!("sobel.wgsl");

    /// Dense 2D convolution with a caller-supplied square kernel.
    pub const CONVOLVE: &'static str = include_str!("convolve.wgsl");

    /// One direction of a separable Gaussian blur.
    pub const BLUR: &'static str = include_str!("blur.wgsl");
}
