use image::GrayImage;
use rayon::prelude::*;

/// Median filter over a grayscale image.
///
/// `size` is the window edge length; even sizes are widened to the next odd
/// value so the window stays centered. Borders replicate the edge pixel.
pub fn median_filter(image: &GrayImage, size: usize) -> GrayImage {
    let width = image.width() as usize;
    let height = image.height() as usize;
    if width == 0 || height == 0 || size <= 1 {
        return image.clone();
    }

    let half = (size / 2) as isize;
    let src = image.as_raw();
    let mut out = GrayImage::new(image.width(), image.height());

    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut window = Vec::with_capacity((2 * half as usize + 1).pow(2));
            for (x, out_px) in row.iter_mut().enumerate() {
                window.clear();
                for dy in -half..=half {
                    let sy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                    for dx in -half..=half {
                        let sx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                        window.push(src[sy * width + sx]);
                    }
                }
                window.sort_unstable();
                *out_px = window[window.len() / 2];
            }
        });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_median_removes_salt_noise() {
        let mut img = GrayImage::from_pixel(9, 9, Luma([40]));
        img.put_pixel(4, 4, Luma([255]));
        let filtered = median_filter(&img, 3);
        assert_eq!(filtered.get_pixel(4, 4)[0], 40);
    }

    #[test]
    fn test_median_keeps_constant_image() {
        let img = GrayImage::from_pixel(7, 5, Luma([123]));
        let filtered = median_filter(&img, 5);
        assert!(filtered.pixels().all(|p| p[0] == 123));
    }

    #[test]
    fn test_size_one_is_identity() {
        let mut img = GrayImage::from_pixel(4, 4, Luma([9]));
        img.put_pixel(1, 1, Luma([200]));
        let filtered = median_filter(&img, 1);
        assert_eq!(img, filtered);
    }
}
