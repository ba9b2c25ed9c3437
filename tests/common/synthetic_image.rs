use std::f32::consts::PI;

/// Concentric dark rings with the given `period` around the image centre,
/// out to `radius` pixels; flat mid-gray beyond.
pub fn ring_pattern_u8(width: usize, height: usize, period: f32, radius: f32) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(period > 0.0, "period must be positive");

    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let mut img = vec![128u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let r = (dx * dx + dy * dy).sqrt();
            if r <= radius {
                let v = 128.0 + 100.0 * (2.0 * PI * r / period).cos();
                img[y * width + x] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    img
}

/// Straight sinusoidal ridges running along `theta` (radians from +x, y down).
pub fn stripes_u8(width: usize, height: usize, theta: f32, period: f32) -> Vec<u8> {
    let (s, c) = theta.sin_cos();
    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let d = -(x as f32) * s + y as f32 * c;
            let v = 128.0 + 100.0 * (2.0 * PI * d / period).cos();
            img[y * width + x] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    img
}

/// Uniform image.
pub fn blank_u8(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}
