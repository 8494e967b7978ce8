//! Submission intake
//!
//! validate → compress image → check archive → upload picture → upload
//! archive → insert row. Each step aborts the rest on failure; uploads
//! that already happened are not rolled back and their keys are logged.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use shared::error::{AppError, ErrorCode};
use shared::models::{ApplicantFields, Submission, SubmissionCreate};
use uuid::Uuid;

use crate::auth::Session;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::storage::Bucket;

/// Raw upload cap per file (20MB)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Compressed picture cap (1MB)
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

/// Longest side of the compressed picture
pub const MAX_IMAGE_DIMENSION: u32 = 1080;

/// JPEG qualities tried in order until the output fits
const JPEG_QUALITY_STEPS: &[u8] = &[85, 75, 65, 55, 45, 35, 30];

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";
const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// Everything the intake form posts
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    pub fields: ApplicantFields,
    pub profile_picture: Option<UploadedFile>,
    pub source_code: Option<UploadedFile>,
}

impl IntakeForm {
    /// Both files present and non-empty, every text field filled in
    fn take_complete(self) -> Result<(ApplicantFields, UploadedFile, UploadedFile), AppError> {
        let incomplete = || AppError::new(ErrorCode::SubmissionIncomplete);
        if let Some(field) = self.fields.first_missing() {
            return Err(incomplete().with_detail("field", field));
        }
        let picture = self
            .profile_picture
            .filter(|f| !f.data.is_empty())
            .ok_or_else(|| incomplete().with_detail("field", "profile_picture"))?;
        let archive = self
            .source_code
            .filter(|f| !f.data.is_empty())
            .ok_or_else(|| incomplete().with_detail("field", "source_code"))?;
        Ok((self.fields, picture, archive))
    }
}

/// Per-submission key suffix: upload time plus a random tag, so two
/// intakes in the same millisecond never share objects
pub fn upload_tag(millis: i64) -> String {
    format!("{millis}-{}", Uuid::new_v4().simple())
}

pub fn profile_picture_key(tag: &str) -> String {
    format!("profile-pic-{tag}")
}

pub fn source_code_key(tag: &str) -> String {
    format!("source-code-{tag}.zip")
}

fn check_size(field: &'static str, file: &UploadedFile) -> Result<(), AppError> {
    if file.data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "File too large: {} bytes (max {MAX_UPLOAD_BYTES})",
                file.data.len()
            ),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Re-encode as JPEG, at most [`MAX_IMAGE_DIMENSION`] px on the longest
/// side and at most [`MAX_IMAGE_BYTES`].
pub fn compress_image(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let failed = |reason: String| {
        AppError::new(ErrorCode::ImageCompressionFailed).with_detail("reason", reason)
    };

    let img = image::load_from_memory(data).map_err(|e| failed(e.to_string()))?;
    let img = if img.width() > MAX_IMAGE_DIMENSION || img.height() > MAX_IMAGE_DIMENSION {
        img.resize(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    for &quality in JPEG_QUALITY_STEPS {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| failed(e.to_string()))?;
        if buffer.len() <= MAX_IMAGE_BYTES {
            tracing::debug!(
                quality,
                original = data.len(),
                compressed = buffer.len(),
                "Image compressed"
            );
            return Ok(buffer);
        }
    }

    Err(failed(format!("could not fit image under {MAX_IMAGE_BYTES} bytes")))
}

/// The archive must open as a ZIP file
pub fn validate_archive(data: &[u8]) -> Result<(), AppError> {
    zip::ZipArchive::new(Cursor::new(data))
        .map(|_| ())
        .map_err(|e| AppError::new(ErrorCode::ArchiveInvalid).with_detail("reason", e.to_string()))
}

fn upload_failed(key: &str) -> AppError {
    AppError::new(ErrorCode::UploadFailed).with_detail("key", key.to_string())
}

pub async fn submit(state: &AppState, session: &Session, form: IntakeForm) -> ServiceResult<Submission> {
    let (fields, picture, archive) = form.take_complete()?;
    check_size("profile_picture", &picture)?;
    check_size("source_code", &archive)?;

    let compressed = compress_image(&picture.data)?;
    validate_archive(&archive.data)?;

    let tag = upload_tag(crate::db::now_millis());
    let picture_key = profile_picture_key(&tag);
    let archive_key = source_code_key(&tag);

    state
        .objects
        .put(Bucket::ProfilePictures, &picture_key, compressed, IMAGE_CONTENT_TYPE)
        .await
        .map_err(|e| {
            tracing::error!(key = %picture_key, error = %e, "Profile picture upload failed");
            upload_failed(&picture_key)
        })?;

    if let Err(e) = state
        .objects
        .put(Bucket::SourceCode, &archive_key, archive.data, ARCHIVE_CONTENT_TYPE)
        .await
    {
        tracing::error!(key = %archive_key, error = %e, "Source archive upload failed");
        tracing::warn!(
            orphaned = %picture_key,
            bucket = %Bucket::ProfilePictures,
            "Orphaned upload left in storage"
        );
        return Err(upload_failed(&archive_key).into());
    }

    let create = SubmissionCreate {
        user_id: session.user_id,
        full_name: fields.full_name,
        phone_number: fields.phone_number,
        location: fields.location,
        email: fields.email,
        hobbies: fields.hobbies,
        profile_picture_key: picture_key.clone(),
        source_code_key: archive_key.clone(),
    };

    let submission = state.submissions.insert(create).await.map_err(|e| {
        tracing::warn!(
            profile_picture = %picture_key,
            source_code = %archive_key,
            "Orphaned uploads left in storage"
        );
        e
    })?;

    tracing::info!(
        submission_id = %submission.id,
        user_id = %session.user_id,
        "Submission received"
    );
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Write;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn large_images_are_scaled_to_the_cap() {
        let jpeg = compress_image(&png(2160, 1200)).unwrap();
        assert!(jpeg.len() <= MAX_IMAGE_BYTES);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 1080);
        assert_eq!(decoded.height(), 600);
    }

    #[test]
    fn small_images_keep_their_size() {
        let decoded = image::load_from_memory(&compress_image(&png(64, 32)).unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn garbage_is_not_an_image() {
        let err = compress_image(b"definitely not pixels").unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageCompressionFailed);
    }

    #[test]
    fn archive_must_be_zip() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("main.rs", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"fn main() {}").unwrap();
            writer.finish().unwrap();
        }
        assert!(validate_archive(buf.get_ref()).is_ok());
        assert_eq!(
            validate_archive(b"PK?? nope").unwrap_err().code,
            ErrorCode::ArchiveInvalid
        );
    }

    #[test]
    fn keys_follow_bucket_conventions() {
        assert_eq!(profile_picture_key("1700000000000-ab"), "profile-pic-1700000000000-ab");
        assert_eq!(source_code_key("1700000000000-ab"), "source-code-1700000000000-ab.zip");
    }

    #[test]
    fn same_millisecond_tags_differ() {
        let a = upload_tag(1700000000000);
        let b = upload_tag(1700000000000);
        assert!(a.starts_with("1700000000000-"));
        assert_ne!(a, b);
        assert_ne!(profile_picture_key(&a), profile_picture_key(&b));
    }

    #[test]
    fn missing_archive_is_incomplete() {
        let form = IntakeForm {
            fields: ApplicantFields {
                full_name: "Ada".into(),
                phone_number: "555".into(),
                location: "London".into(),
                email: "ada@example.com".into(),
                hobbies: "chess".into(),
            },
            profile_picture: Some(UploadedFile {
                file_name: Some("me.png".into()),
                data: vec![1],
            }),
            source_code: None,
        };
        let err = form.take_complete().unwrap_err();
        assert_eq!(err.code, ErrorCode::SubmissionIncomplete);
        assert_eq!(err.message, "Please fill in all fields and upload your files.");
    }
}
