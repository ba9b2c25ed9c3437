//! Binary raster: every sample is 0 (background) or 1 (ridge / foreground).
use super::{GrayImageU8, ImageU8, ImageView, ImageViewMut};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryImage {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl BinaryImage {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h],
        }
    }

    /// Build from a predicate evaluated at every (x, y).
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(u8::from(f(x, y)));
            }
        }
        Self { w, h, data }
    }

    /// Mark pixels strictly darker than `threshold` as set.
    pub fn from_dark_pixels(gray: &ImageU8<'_>, threshold: u8) -> Self {
        Self::from_fn(gray.w, gray.h, |x, y| gray.get(x, y) < threshold)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.w + x] = u8::from(on);
    }

    /// Sample with out-of-range coordinates reading as background.
    #[inline]
    pub fn get_or_zero(&self, x: isize, y: isize) -> u8 {
        if x < 0 || y < 0 || x >= self.w as isize || y >= self.h as isize {
            0
        } else {
            self.get(x as usize, y as usize)
        }
    }

    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Render set pixels as `on` and the rest as `off`.
    pub fn to_gray(&self, on: u8, off: u8) -> GrayImageU8 {
        let data = self
            .data
            .iter()
            .map(|&v| if v != 0 { on } else { off })
            .collect();
        GrayImageU8::new(self.w, self.h, data)
    }
}

impl ImageView for BinaryImage {
    type Pixel = u8;

    fn width(&self) -> usize {
        self.w
    }
    fn height(&self) -> usize {
        self.h
    }
    fn stride(&self) -> usize {
        self.w
    }
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}

impl ImageViewMut for BinaryImage {
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.w;
        &mut self.data[start..start + self.w]
    }
}
