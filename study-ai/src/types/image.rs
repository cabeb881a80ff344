/// Raw bytes of a downloaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub bytes: Vec<u8>,
    /// MIME type as reported by the image host, e.g. `image/jpeg`.
    pub content_type: String,
}

impl Image {
    /// File extension to store the image under inside a package.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            _ => "jpeg",
        }
    }
}
