//! Image upload handler.
//!
//! The request body is the raw image and `Content-Type` names its format. The
//! response carries the public URL the client stores on a product or profile.

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::ImageKind;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Largest accepted image body.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[schema(example = "/uploads/3fa85f6457174562b3fc2c963f66afa6.png")]
    pub image_url: String,
}

fn image_kind(req: &HttpRequest) -> Result<ImageKind, Error> {
    let raw = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    // Ignore parameters such as `; charset=binary`.
    let mime = raw.split(';').next().unwrap_or_default();
    ImageKind::from_mime(mime).ok_or_else(|| {
        Error::invalid_request("image must be image/jpeg or image/png").with_details(json!({
            "field": "contentType",
            "code": "unsupported_media_type",
            "value": raw,
        }))
    })
}

/// Store an image and return its public URL.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    request_body(content = Vec<u8>, content_type = "image/png", description = "Raw JPEG or PNG bytes"),
    responses(
        (status = 200, description = "Stored image", body = UploadResponse),
        (status = 400, description = "Empty body or unsupported type", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Image store unavailable", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "uploadImage"
)]
#[post("/uploads")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    auth: Authenticated,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<UploadResponse>> {
    let kind = image_kind(&req)?;
    let image_url = state
        .uploads
        .upload(auth.caller(), kind, body.to_vec())
        .await?;
    Ok(web::Json(UploadResponse { image_url }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;

    use super::*;
    use crate::domain::Role;
    use crate::domain::ports::MockImageUploadCommand;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{authorised, fixture_ports, test_app};
    use crate::test_support::caller;

    #[rstest]
    #[case("image/png", Some(ImageKind::Png))]
    #[case("image/jpeg; charset=binary", Some(ImageKind::Jpeg))]
    #[case("image/gif", None)]
    #[case("", None)]
    fn content_type_selects_the_kind(#[case] header: &str, #[case] expected: Option<ImageKind>) {
        let req = actix_test::TestRequest::post()
            .insert_header((CONTENT_TYPE, header))
            .to_http_request();
        assert_eq!(image_kind(&req).ok(), expected);
    }

    #[actix_web::test]
    async fn upload_returns_the_image_url() {
        let user = caller("guest@example.com", Role::User);
        let mut uploads = MockImageUploadCommand::new();
        uploads
            .expect_upload()
            .withf(|_, kind, bytes| *kind == ImageKind::Png && bytes.as_slice() == b"\x89PNG")
            .times(1)
            .return_once(|_, _, _| Ok("/uploads/abc.png".to_owned()));
        let ports = HttpStatePorts {
            uploads: Arc::new(uploads),
            ..fixture_ports()
        };
        let app = actix_test::init_service(test_app(ports)).await;

        let req = authorised(
            actix_test::TestRequest::post()
                .uri("/api/v1/uploads")
                .insert_header((CONTENT_TYPE, "image/png"))
                .set_payload(&b"\x89PNG"[..]),
            &user,
        )
        .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: UploadResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.image_url, "/uploads/abc.png");
    }

    #[actix_web::test]
    async fn unsupported_types_never_reach_the_store() {
        let user = caller("guest@example.com", Role::User);
        let app = actix_test::init_service(test_app(fixture_ports())).await;
        let req = authorised(
            actix_test::TestRequest::post()
                .uri("/api/v1/uploads")
                .insert_header((CONTENT_TYPE, "text/plain"))
                .set_payload("hello"),
            &user,
        )
        .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
