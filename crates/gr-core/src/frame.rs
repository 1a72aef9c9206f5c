use std::fmt;

/// Frame brute livrée par le décodeur : pixels RGBA row-major, 4 bytes par pixel.
///
/// # Example
/// ```
/// use gr_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    ///
    /// # Example
    /// ```
    /// use gr_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(10, 10);
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if idx + 3 >= self.data.len() {
            return (0, 0, 0, 0);
        }
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Luma BT.601 (mêmes poids que la conversion BGR→gris usuelle).
    ///
    /// # Example
    /// ```
    /// use gr_core::frame::FrameBuffer;
    /// let mut fb = FrameBuffer::new(1, 1);
    /// fb.data.copy_from_slice(&[255, 255, 255, 255]);
    /// assert_eq!(fb.luma(0, 0), 255);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        let (r, g, b, _) = self.pixel(x, y);
        ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114 + 500) / 1000) as u8
    }
}

/// Single-channel intensity grid (0–255), row-major.
///
/// # Example
/// ```
/// use gr_core::frame::{FrameBuffer, GrayFrame};
/// let gray = GrayFrame::from_rgba(&FrameBuffer::new(4, 2));
/// assert_eq!((gray.width, gray.height), (4, 2));
/// assert_eq!(gray.data.len(), 8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl GrayFrame {
    /// Wrap an existing intensity buffer.
    ///
    /// Returns `None` when `data.len() != width * height`.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            data,
            width,
            height,
        })
    }

    /// Grayscale conversion of a decoded RGBA frame.
    #[must_use]
    pub fn from_rgba(frame: &FrameBuffer) -> Self {
        let mut data = Vec::with_capacity(frame.width as usize * frame.height as usize);
        for y in 0..frame.height {
            for x in 0..frame.width {
                data.push(frame.luma(x, y));
            }
        }
        Self {
            data,
            width: frame.width,
            height: frame.height,
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }
}

/// One rendered text frame: `height` rows of exactly `width` glyphs each.
///
/// Immutable once built; the consumer only ever keeps the latest one.
///
/// # Example
/// ```
/// use gr_core::frame::TextFrame;
/// let tf = TextFrame::from_rows(vec!["ab".into(), "cd".into()]).unwrap();
/// assert_eq!(tf.width(), 2);
/// assert_eq!(tf.to_text(), "ab\ncd");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextFrame {
    rows: Vec<String>,
    width: usize,
}

impl TextFrame {
    /// Build from rows. Returns `None` if rows differ in glyph count.
    #[must_use]
    pub fn from_rows(rows: Vec<String>) -> Option<Self> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        if rows.iter().any(|r| r.chars().count() != width) {
            return None;
        }
        Some(Self { rows, width })
    }

    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Glyphs per row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows joined with `\n`, no trailing newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.rows.join("\n")
    }
}

impl fmt::Display for TextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}
