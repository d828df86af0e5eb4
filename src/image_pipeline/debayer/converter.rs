use crate::image_pipeline::common::error::Result;

/// Turns a raw color filter array buffer into interleaved 8-bit RGB.
///
/// Implementations may hold native resources; `dispose` releases them and is
/// called exactly once by the acquisition loop when it exits.
pub trait ColorConverter: Send {
    /// Returns `width * height * 3` bytes.
    fn transform_to_24(&mut self, buffer: &[u16], width: usize, height: usize) -> Result<Vec<u8>>;

    fn dispose(&mut self) {}
}

impl<C: ColorConverter + ?Sized> ColorConverter for Box<C> {
    fn transform_to_24(&mut self, buffer: &[u16], width: usize, height: usize) -> Result<Vec<u8>> {
        (**self).transform_to_24(buffer, width, height)
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}

/// Owns a converter for the lifetime of the loop and disposes it on drop,
/// including when the loop unwinds.
pub struct ConverterLease<C: ColorConverter> {
    converter: Option<C>,
}

impl<C: ColorConverter> ConverterLease<C> {
    pub fn new(converter: Option<C>) -> Self {
        Self { converter }
    }

    pub fn get_mut(&mut self) -> Option<&mut C> {
        self.converter.as_mut()
    }
}

impl<C: ColorConverter> Drop for ConverterLease<C> {
    fn drop(&mut self) {
        if let Some(mut converter) = self.converter.take() {
            converter.dispose();
        }
    }
}
