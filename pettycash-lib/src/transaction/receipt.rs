use base64::Engine;
use serde::{Deserialize, Serialize};

pub const MAX_RECEIPT_KILOBYTES: usize = 2048;
const MAX_RECEIPT_BYTES: usize = MAX_RECEIPT_KILOBYTES * 1024;

/// Receipt image as submitted in a transaction body: base64 data plus its declared type.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ReceiptUpload {
    pub content_type: String,
    pub data: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    pub fn from_content_type(content_type: &str) -> Option<ImageFormat> {
        match content_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Detects the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    pub fn from_extension(path: &str) -> Option<ImageFormat> {
        let (_, extension) = path.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }

    pub const fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReceiptImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ReceiptUpload {
    /// Decodes and checks the upload. The error is the message reported for the `receipt` field.
    pub fn decode(&self) -> Result<ReceiptImage, &'static str> {
        let declared = ImageFormat::from_content_type(&self.content_type)
            .ok_or("The receipt must be a file of type: jpeg, png, jpg, gif.")?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|_| "The receipt must be an image.")?;
        if bytes.len() > MAX_RECEIPT_BYTES {
            return Err("The receipt may not be greater than 2048 kilobytes.");
        }

        match ImageFormat::sniff(&bytes) {
            // jpg and jpeg are the same format, so only the family has to agree.
            Some(format) if format == declared => Ok(ReceiptImage { format, bytes }),
            _ => Err("The receipt must be an image."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 16, b'J', b'F', b'I', b'F'];
    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

    fn upload(content_type: &str, bytes: &[u8]) -> ReceiptUpload {
        ReceiptUpload {
            content_type: content_type.to_owned(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    #[rstest]
    #[case("image/png", PNG, ImageFormat::Png)]
    #[case("image/jpeg", JPEG, ImageFormat::Jpeg)]
    #[case("image/jpg", JPEG, ImageFormat::Jpeg)]
    #[case("IMAGE/GIF", GIF, ImageFormat::Gif)]
    fn accepted(#[case] content_type: &str, #[case] bytes: &[u8], #[case] format: ImageFormat) {
        let image = upload(content_type, bytes).decode().unwrap();
        assert_eq!(image.format, format);
        assert_eq!(image.bytes, bytes);
    }

    #[test]
    fn wrong_declared_type() {
        assert_eq!(
            upload("application/pdf", b"%PDF-1.4").decode(),
            Err("The receipt must be a file of type: jpeg, png, jpg, gif.")
        );
    }

    #[test]
    fn content_does_not_match_type() {
        assert_eq!(
            upload("image/png", JPEG).decode(),
            Err("The receipt must be an image.")
        );
        assert_eq!(
            upload("image/png", b"plain text").decode(),
            Err("The receipt must be an image.")
        );
    }

    #[test]
    fn not_base64() {
        let upload = ReceiptUpload {
            content_type: "image/png".to_owned(),
            data: "***".to_owned(),
        };
        assert_eq!(upload.decode(), Err("The receipt must be an image."));
    }

    #[test]
    fn size_limit() {
        let mut bytes = PNG.to_vec();
        bytes.resize(MAX_RECEIPT_BYTES, 0);
        assert!(upload("image/png", &bytes).decode().is_ok());

        bytes.push(0);
        assert_eq!(
            upload("image/png", &bytes).decode(),
            Err("The receipt may not be greater than 2048 kilobytes.")
        );
    }

    #[rstest]
    #[case("receipts/a.png", Some(ImageFormat::Png))]
    #[case("receipts/a.JPEG", Some(ImageFormat::Jpeg))]
    #[case("receipts/a.gif", Some(ImageFormat::Gif))]
    #[case("receipts/a", None)]
    fn extensions(#[case] path: &str, #[case] format: Option<ImageFormat>) {
        assert_eq!(ImageFormat::from_extension(path), format);
    }
}
