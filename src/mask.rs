// src/mask.rs - Flat binary masks and the initial foreground/allowed-region split

/// Binary per-pixel mask stored row-major, indexed by `y * width + x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// Create an all-unset mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Wrap an existing buffer; the buffer length must be `width * height`
    pub fn from_vec(width: u32, height: u32, data: Vec<bool>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize,
            "mask buffer length must equal width * height"
        );
        Self { width, height, data }
    }

    /// Build a mask by evaluating `f` for every pixel index
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            data: (0..len).map(&mut f).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[self.index(x, y)]
    }

    /// Signed lookup where out-of-bounds coordinates read as unset
    #[inline]
    pub fn get_or_unset(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [bool] {
        &mut self.data
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Pixel-wise AND
    pub fn and(&self, other: &Mask) -> Mask {
        self.zip_with(other, |a, b| a && b)
    }

    /// Pixel-wise `self AND NOT other`
    pub fn and_not(&self, other: &Mask) -> Mask {
        self.zip_with(other, |a, b| a && !b)
    }

    /// True when every set pixel of `self` is also set in `other`
    pub fn is_subset_of(&self, other: &Mask) -> bool {
        self.data.iter().zip(&other.data).all(|(&a, &b)| !a || b)
    }

    /// True when no pixel is set in both masks
    pub fn is_disjoint(&self, other: &Mask) -> bool {
        self.data.iter().zip(&other.data).all(|(&a, &b)| !(a && b))
    }

    fn zip_with<F>(&self, other: &Mask, f: F) -> Mask
    where
        F: Fn(bool, bool) -> bool,
    {
        assert_eq!(self.len(), other.len(), "mask dimensions must match");
        Mask {
            width: self.width,
            height: self.height,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect(),
        }
    }
}

/// The two masks produced from cluster membership and luma
#[derive(Debug, Clone)]
pub struct InitialMasks {
    /// Pixels outside the background cluster; later growth never leaves this region
    pub allow: Mask,
    /// `allow` pixels whose luma is at most `threshold + slack`
    pub foreground: Mask,
}

/// Combine cluster membership and the global luma threshold
pub fn build_initial_masks(
    width: u32,
    height: u32,
    assignments: &[usize],
    background: usize,
    luma: &[u8],
    threshold: u8,
    slack: u8,
) -> InitialMasks {
    let limit = threshold as u16 + slack as u16;

    let allow = Mask::from_fn(width, height, |i| assignments[i] != background);
    let foreground = Mask::from_fn(width, height, |i| {
        allow.as_slice()[i] && (luma[i] as u16) <= limit
    });

    InitialMasks { allow, foreground }
}
