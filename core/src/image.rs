use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// Grayscale depth map: 255 = nearest to the viewer, 0 = farthest.
pub type DepthMap = GrayImage;

/// RGB stereogram or repeating fill pattern.
pub type Stereogram = RgbImage;

pub fn create_gray_image(width: u32, height: u32) -> GrayImage {
    ImageBuffer::new(width, height)
}

pub fn create_rgb_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::new(width, height)
}

pub fn get_pixel_gray(img: &GrayImage, x: u32, y: u32) -> u8 {
    img.get_pixel(x, y)[0]
}

pub fn set_pixel_gray(img: &mut GrayImage, x: u32, y: u32, value: u8) {
    img.put_pixel(x, y, Luma([value]));
}

pub fn get_pixel_rgb(img: &RgbImage, x: u32, y: u32) -> [u8; 3] {
    let p = img.get_pixel(x, y);
    [p[0], p[1], p[2]]
}

pub fn set_pixel_rgb(img: &mut RgbImage, x: u32, y: u32, rgb: [u8; 3]) {
    img.put_pixel(x, y, Rgb(rgb));
}

/// Collapse an RGB image to single-channel luminance.
pub fn rgb_to_luma(rgb: &RgbImage) -> GrayImage {
    image::imageops::colorops::grayscale(rgb)
}

/// True when the image has zero area (either dimension is 0).
pub fn is_empty<P, C>(img: &ImageBuffer<P, C>) -> bool
where
    P: image::Pixel,
    C: std::ops::Deref<Target = [P::Subpixel]>,
{
    img.width() == 0 || img.height() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_roundtrip() {
        let mut img = create_rgb_image(4, 4);
        set_pixel_rgb(&mut img, 2, 1, [10, 20, 30]);
        assert_eq!(get_pixel_rgb(&img, 2, 1), [10, 20, 30]);
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&create_gray_image(0, 5)));
        assert!(is_empty(&create_gray_image(5, 0)));
        assert!(!is_empty(&create_gray_image(1, 1)));
    }

    #[test]
    fn test_luma_of_gray_pixel() {
        let mut img = create_rgb_image(2, 2);
        set_pixel_rgb(&mut img, 0, 0, [200, 200, 200]);
        let gray = rgb_to_luma(&img);
        assert_eq!(get_pixel_gray(&gray, 0, 0), 200);
    }
}
