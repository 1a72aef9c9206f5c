use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use gr_core::frame::GrayFrame;

/// Resizer réutilisable wrappant fast_image_resize, en niveaux de gris.
///
/// Filtre boîte (moyenne par zone) : déterministe pour une entrée donnée.
///
/// # Example
/// ```
/// use gr_ascii::resize::GrayResizer;
/// let r = GrayResizer::new();
/// ```
pub struct GrayResizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
}

impl GrayResizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box)),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst` (`dst_w × dst_h` bytes, row-major).
    ///
    /// # Errors
    /// Returns an error if either side has a zero dimension or the resize fails.
    ///
    /// # Example
    /// ```
    /// use gr_ascii::resize::GrayResizer;
    /// use gr_core::frame::GrayFrame;
    /// let mut r = GrayResizer::new();
    /// let src = GrayFrame::from_raw(4, 4, vec![200; 16]).unwrap();
    /// let mut dst = vec![0u8; 4];
    /// r.resize_into(&src, 2, 2, &mut dst).unwrap();
    /// assert!(dst.iter().all(|&v| v.abs_diff(200) <= 1));
    /// ```
    pub fn resize_into(
        &mut self,
        src: &GrayFrame,
        dst_w: u32,
        dst_h: u32,
        dst: &mut Vec<u8>,
    ) -> Result<()> {
        dst.clear();
        dst.resize(dst_w as usize * dst_h as usize, 0);

        if src.width == dst_w && src.height == dst_h {
            dst.copy_from_slice(&src.data);
            return Ok(());
        }

        // fast_image_resize exige &mut sur la source
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image = Image::from_slice_u8(
            src.width,
            src.height,
            self.src_buf.as_mut_slice(),
            PixelType::U8,
        )
        .context("Invalid source dimensions")?;

        let mut dst_image = Image::from_slice_u8(dst_w, dst_h, dst.as_mut_slice(), PixelType::U8)
            .context("Invalid destination dimensions")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(())
    }
}

impl Default for GrayResizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Échantillonnage au plus proche voisin, sans allocation externe.
///
/// Repli utilisé si le resizer convolutif refuse les dimensions.
pub fn nearest_into(src: &GrayFrame, dst_w: u32, dst_h: u32, dst: &mut Vec<u8>) {
    dst.clear();
    dst.reserve(dst_w as usize * dst_h as usize);
    for cy in 0..dst_h {
        for cx in 0..dst_w {
            if src.width == 0 || src.height == 0 {
                dst.push(0);
                continue;
            }
            let px = (u64::from(cx) * u64::from(src.width) / u64::from(dst_w.max(1))) as u32;
            let py = (u64::from(cy) * u64::from(src.height) / u64::from(dst_h.max(1))) as u32;
            dst.push(src.get(
                px.min(src.width.saturating_sub(1)),
                py.min(src.height.saturating_sub(1)),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_filter_averages_blocks() {
        // 4×2 : moitié gauche 0, moitié droite 200
        let src = GrayFrame::from_raw(4, 2, vec![0, 0, 200, 200, 0, 0, 200, 200]).unwrap();
        let mut dst = Vec::new();
        GrayResizer::new().resize_into(&src, 2, 1, &mut dst).unwrap();
        assert_eq!(dst.len(), 2);
        assert!(dst[0] <= 2, "gauche: {}", dst[0]);
        assert!(dst[1] >= 198, "droite: {}", dst[1]);
    }

    #[test]
    fn same_size_is_a_copy() {
        let src = GrayFrame::from_raw(2, 2, vec![1, 2, 3, 4]).unwrap();
        let mut dst = Vec::new();
        GrayResizer::new().resize_into(&src, 2, 2, &mut dst).unwrap();
        assert_eq!(dst, src.data);
    }

    #[test]
    fn resize_is_deterministic() {
        let data: Vec<u8> = (0..64u8).map(|v| v.wrapping_mul(37)).collect();
        let src = GrayFrame::from_raw(8, 8, data).unwrap();
        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut r = GrayResizer::new();
        r.resize_into(&src, 3, 5, &mut a).unwrap();
        r.resize_into(&src, 3, 5, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn nearest_handles_empty_source() {
        let src = GrayFrame::from_raw(0, 0, Vec::new()).unwrap();
        let mut dst = Vec::new();
        nearest_into(&src, 3, 2, &mut dst);
        assert_eq!(dst, vec![0; 6]);
    }

    #[test]
    fn nearest_picks_top_left_of_each_cell() {
        let src = GrayFrame::from_raw(2, 2, vec![10, 20, 30, 40]).unwrap();
        let mut dst = Vec::new();
        nearest_into(&src, 4, 2, &mut dst);
        assert_eq!(dst, vec![10, 10, 20, 20, 30, 30, 40, 40]);
    }
}
