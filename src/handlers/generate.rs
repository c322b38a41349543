use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::keywords::{classify, KeywordResult};
use crate::render::{encode_png_data_uri, random_background, render_mockup, ReferenceData};
use crate::state::AppState;
use crate::utils::media::{detect_mime_type, is_image_mime};
use crate::utils::timing::{complete_request_timer, start_request_timer};

const MAIN_DESCRIPTION_FIELD: &str = "main_description";
const REFERENCE_IMAGE_PREFIX: &str = "reference_image_";
const REFERENCE_DESCRIPTION_PREFIX: &str = "reference_description_";

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub image: String,
    pub keywords: KeywordResult,
}

#[derive(Debug, Default)]
pub struct GenerateForm {
    pub main_description: String,
    pub references: Vec<ReferenceData>,
}

#[derive(Debug)]
struct UploadedReference {
    index: String,
    image_name: String,
}

fn field_index(name: &str) -> &str {
    name.rsplit('_').next().unwrap_or_default()
}

pub(crate) async fn read_generate_form(mut multipart: Multipart) -> Result<GenerateForm, AppError> {
    let mut main_description: Option<String> = None;
    let mut uploads: Vec<UploadedReference> = Vec::new();
    let mut descriptions: HashMap<String, String> = HashMap::new();
    let mut seen_images: HashSet<String> = HashSet::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == MAIN_DESCRIPTION_FIELD {
            let text = field.text().await?;
            if main_description.is_none() {
                main_description = Some(text);
            }
        } else if name.starts_with(REFERENCE_DESCRIPTION_PREFIX) {
            let text = field.text().await?;
            descriptions
                .entry(field_index(&name).to_string())
                .or_insert(text);
        } else if name.starts_with(REFERENCE_IMAGE_PREFIX) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            if !seen_images.insert(name.clone()) {
                debug!("Skipping repeated {name}: {file_name}");
                continue;
            }
            if file_name.is_empty() {
                debug!("Skipping {name}: no file selected");
                continue;
            }

            match detect_mime_type(&bytes) {
                Some(mime) if is_image_mime(&mime) => {
                    debug!("Reference {name}: {file_name} ({mime}, {} bytes)", bytes.len());
                }
                other => {
                    warn!(
                        "Reference {name}: {file_name} does not look like an image (detected={:?}, {} bytes)",
                        other,
                        bytes.len()
                    );
                }
            }

            uploads.push(UploadedReference {
                index: field_index(&name).to_string(),
                image_name: file_name,
            });
        } else {
            debug!("Ignoring unexpected form field {name}");
        }
    }

    let references = uploads
        .into_iter()
        .map(|upload| ReferenceData {
            description: descriptions.get(&upload.index).cloned().unwrap_or_default(),
            image_name: upload.image_name,
        })
        .collect();

    Ok(GenerateForm {
        main_description: main_description.unwrap_or_default(),
        references,
    })
}

pub async fn generate_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    let mut timer = start_request_timer("/generate");

    let form = match read_generate_form(multipart).await {
        Ok(form) => form,
        Err(err) => {
            let err = err.with_upload_limit(state.max_upload_bytes);
            complete_request_timer(&mut timer, "error", Some(err.to_string()));
            return Err(err);
        }
    };
    timer.describe(&form.main_description, form.references.len());

    let keywords = classify(&form.main_description);
    let background = random_background();
    let reference_count = form.references.len();
    let typeface = Arc::clone(&state.typeface);
    let overlay_keywords = keywords.clone();

    let rendered = tokio::task::spawn_blocking(move || {
        let canvas = render_mockup(
            &form.main_description,
            &form.references,
            &overlay_keywords,
            background,
            &typeface,
        );
        encode_png_data_uri(&canvas)
    })
    .await;

    let rendered = match rendered {
        Ok(result) => result.map_err(AppError::from),
        Err(err) => Err(AppError::from(err)),
    };
    let image = match rendered {
        Ok(image) => image,
        Err(err) => {
            complete_request_timer(&mut timer, "error", Some(err.to_string()));
            return Err(err);
        }
    };

    info!(
        "Generated mockup: references={} background=#{:02x}{:02x}{:02x} categories={}",
        reference_count,
        background.0[0],
        background.0[1],
        background.0[2],
        keywords.summary_lines().len()
    );
    complete_request_timer(&mut timer, "success", None);

    Ok(Json(GenerateResponse { image, keywords }))
}
