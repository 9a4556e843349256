//! The validation layer: raw request fields in, typed mutation inputs out.
//! Checks here are per-field only; referential checks (does that group
//! exist?) belong to the handlers.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// One rejected field and why.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every field-level problem found in one submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn single(field: &'static str, message: &'static str) -> Self {
        Self {
            errors: vec![FieldError { field, message }],
        }
    }
}

/// An image attachment as submitted: a name and base64 content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_base64: String,
}

/// A decoded, accepted image attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw fields of a post submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    pub text: Option<String>,
    pub group: Option<i32>,
    pub image: Option<ImageUpload>,
}

/// A validated post submission.
#[derive(Debug, Clone)]
pub struct PostFields {
    pub text: String,
    pub group_id: Option<i32>,
    pub image: Option<ImageFile>,
}

impl PostForm {
    pub fn validate(self) -> Result<PostFields, FormErrors> {
        let mut errors = Vec::new();
        let text = required_text(self.text, &mut errors);
        let image = match self.image {
            Some(upload) => match BASE64.decode(upload.content_base64.as_bytes()) {
                Ok(bytes) => Some(ImageFile {
                    file_name: upload.file_name,
                    bytes,
                }),
                Err(_) => {
                    errors.push(FieldError {
                        field: "image",
                        message: "image content must be valid base64",
                    });
                    None
                }
            },
            None => None,
        };
        if errors.is_empty() {
            Ok(PostFields {
                text,
                group_id: self.group,
                image,
            })
        } else {
            Err(FormErrors { errors })
        }
    }
}

/// Raw fields of a comment submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    pub text: Option<String>,
}

/// A validated comment submission.
#[derive(Debug, Clone)]
pub struct CommentFields {
    pub text: String,
}

impl CommentForm {
    pub fn validate(self) -> Result<CommentFields, FormErrors> {
        let mut errors = Vec::new();
        let text = required_text(self.text, &mut errors);
        if errors.is_empty() {
            Ok(CommentFields { text })
        } else {
            Err(FormErrors { errors })
        }
    }
}

fn required_text(raw: Option<String>, errors: &mut Vec<FieldError>) -> String {
    match raw.map(|t| t.trim().to_owned()) {
        Some(t) if !t.is_empty() => t,
        _ => {
            errors.push(FieldError {
                field: "text",
                message: "this field is required",
            });
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_needs_text() {
        let err = PostForm::default().validate().unwrap_err();
        assert_eq!(err, FormErrors::single("text", "this field is required"));

        let blank = PostForm {
            text: Some("   ".to_owned()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn post_with_group_and_image_passes_through() {
        let form = PostForm {
            text: Some("a new post".to_owned()),
            group: Some(4),
            image: Some(ImageUpload {
                file_name: "cat.png".to_owned(),
                content_base64: BASE64.encode(b"png-bytes"),
            }),
        };
        let fields = form.validate().unwrap();
        assert_eq!(fields.text, "a new post");
        assert_eq!(fields.group_id, Some(4));
        assert_eq!(fields.image.unwrap().bytes, b"png-bytes");
    }

    #[test]
    fn undecodable_image_is_a_field_error() {
        let form = PostForm {
            text: Some("a new post".to_owned()),
            group: None,
            image: Some(ImageUpload {
                file_name: "cat.png".to_owned(),
                content_base64: "!!not base64!!".to_owned(),
            }),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.errors[0].field, "image");
    }

    #[test]
    fn comment_needs_text() {
        assert!(CommentForm { text: None }.validate().is_err());
        let ok = CommentForm {
            text: Some("nice post".to_owned()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.text, "nice post");
    }
}
