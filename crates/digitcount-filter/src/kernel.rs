//! Convolution kernels
//!
//! Defines the kernel structure used by the convolution operations.

use crate::{FilterError, FilterResult};

/// A 2D convolution kernel
///
/// Values are stored row-major. The center defaults to `(width / 2,
/// height / 2)`.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the center
    cx: u32,
    /// Y coordinate of the center
    cy: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
}

impl Kernel {
    /// Create a new zero-filled kernel with the given dimensions.
    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Create a kernel from a slice of row-major values.
    pub fn from_slice(width: u32, height: u32, data: &[f32]) -> FilterResult<Self> {
        let mut kernel = Self::new(width, height)?;
        if data.len() != kernel.data.len() {
            return Err(FilterError::InvalidKernel(format!(
                "expected {} values for a {}x{} kernel, got {}",
                kernel.data.len(),
                width,
                height,
                data.len()
            )));
        }
        kernel.data.copy_from_slice(data);
        Ok(kernel)
    }

    /// Create a box (averaging) kernel.
    ///
    /// All values are `1/(size*size)`.
    pub fn box_kernel(size: u32) -> FilterResult<Self> {
        let mut kernel = Self::new(size, size)?;
        let v = 1.0 / (size * size) as f32;
        kernel.data.fill(v);
        Ok(kernel)
    }

    /// Create a normalized square Gaussian kernel.
    ///
    /// `size` must be odd.
    pub fn gaussian(size: u32, sigma: f32) -> FilterResult<Self> {
        let row = Self::gaussian_1d(size, sigma)?;
        let mut kernel = Self::new(size, size)?;
        for y in 0..size {
            for x in 0..size {
                let v = row.data[x as usize] * row.data[y as usize];
                kernel.set(x, y, v);
            }
        }
        kernel.normalize();
        Ok(kernel)
    }

    /// Create a normalized horizontal (`size x 1`) Gaussian kernel.
    ///
    /// Transpose it with [`Kernel::transposed`] for the vertical pass.
    pub fn gaussian_1d(size: u32, sigma: f32) -> FilterResult<Self> {
        if size % 2 == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "Gaussian kernel size must be odd, got {}",
                size
            )));
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(FilterError::InvalidParameters(format!(
                "sigma must be positive, got {}",
                sigma
            )));
        }
        let mut kernel = Self::new(size, 1)?;
        let half = (size / 2) as i32;
        let denom = 2.0 * sigma * sigma;
        for i in 0..size {
            let d = (i as i32 - half) as f32;
            kernel.set(i, 0, (-(d * d) / denom).exp());
        }
        kernel.normalize();
        Ok(kernel)
    }

    /// Return a copy with rows and columns swapped.
    pub fn transposed(&self) -> Self {
        let mut data = vec![0.0; self.data.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                data[(x * self.height + y) as usize] = self.data[(y * self.width + x) as usize];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cx: self.cy,
            cy: self.cx,
            data,
        }
    }

    /// Get the kernel width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the kernel height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the center X coordinate.
    #[inline]
    pub fn center_x(&self) -> u32 {
        self.cx
    }

    /// Get the center Y coordinate.
    #[inline]
    pub fn center_y(&self) -> u32 {
        self.cy
    }

    /// Set the center coordinates.
    pub fn set_center(&mut self, cx: u32, cy: u32) -> FilterResult<()> {
        if cx >= self.width || cy >= self.height {
            return Err(FilterError::InvalidParameters(format!(
                "center ({}, {}) outside {}x{} kernel",
                cx, cy, self.width, self.height
            )));
        }
        self.cx = cx;
        self.cy = cy;
        Ok(())
    }

    /// Get the kernel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize])
    }

    /// Set a value at (x, y). Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = value;
        }
    }

    /// Normalize the kernel so that values sum to 1.
    ///
    /// A kernel summing to zero is left unchanged.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum.abs() > f32::EPSILON {
            self.data.iter_mut().for_each(|v| *v /= sum);
        }
    }

    /// Get the sum of all kernel values.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}
