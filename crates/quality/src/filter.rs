//! Median Filter for Sensor Noise Reduction

/// Sliding window median filter
///
/// Used to smooth single-tick spikes out of noisy channels (turbidity in
/// particular) before display-oriented queries.
pub struct MedianFilter {
    window: Vec<f64>,
    size: usize,
    position: usize,
    filled: bool,
}

impl MedianFilter {
    /// Create a new median filter with given window size (odd, > 0)
    pub fn new(size: usize) -> Self {
        assert!(size > 0 && size % 2 == 1, "Window size must be odd and > 0");
        Self {
            window: vec![0.0; size],
            size,
            position: 0,
            filled: false,
        }
    }

    /// Add a value and get the filtered output
    pub fn filter(&mut self, value: f64) -> f64 {
        self.window[self.position] = value;
        self.position = (self.position + 1) % self.size;

        if self.position == 0 {
            self.filled = true;
        }

        if !self.filled {
            // Return input until window is filled
            return value;
        }

        let mut sorted = self.window.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        sorted[self.size / 2]
    }

    /// Reset the filter
    pub fn reset(&mut self) {
        self.window.fill(0.0);
        self.position = 0;
        self.filled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_suppressed() {
        let mut filter = MedianFilter::new(5);
        for v in [0.3, 0.35, 0.3, 8.0, 0.32] {
            filter.filter(v);
        }
        // The turbidity spike should not survive the median
        let result = filter.filter(0.31);
        assert!(result < 1.0);
    }

    #[test]
    fn test_passthrough_until_filled() {
        let mut filter = MedianFilter::new(3);
        assert_eq!(filter.filter(5.0), 5.0);
        assert_eq!(filter.filter(6.0), 6.0);
    }

    #[test]
    #[should_panic]
    fn test_even_window_rejected() {
        MedianFilter::new(4);
    }
}
