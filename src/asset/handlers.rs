use actix_multipart::Multipart;
use actix_web::{
    HttpResponse, Responder,
    web::{self, Json, Path, Query},
};
use log::{debug, error, info};
use uuid::Uuid;

use crate::asset::models::{
    ListSectionQuery, PatchOrderRequest, ReorderRequest,
};
use crate::asset::multipart::parse_asset_multipart;
use crate::asset::store::UploadOptions;
use crate::blob::BlobPayload;
use crate::state::AppState;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    post,
    path = "/assets",
    request_body(content = inline(crate::asset::models::UploadAssetRequest), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset created successfully", body = crate::asset::models::Asset),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn upload_asset(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing upload_asset handler");
    debug!("Parsing multipart payload into the upload spool.");
    let parsed = match parse_asset_multipart(payload, &data.spool_dir).await {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Failed during upload multipart parsing: {}", e);
            return HttpResponse::from(e);
        }
    };

    let opts = UploadOptions {
        filename: parsed.filename,
        content_type: parsed.content_type,
        category: parsed.category.unwrap_or_default(),
        section: parsed.section,
        slug: parsed.slug,
        order: parsed.order,
        poster_asset_id: parsed.poster_asset_id,
        seeded: false,
    };
    match data
        .store
        .upload(BlobPayload::Spooled(parsed.spooled), opts)
        .await
    {
        Ok(asset) => {
            info!("Asset {} created and stored in catalog.", asset.id);
            data.invalidate_sections();
            HttpResponse::Created().json(asset)
        }
        Err(e) => {
            error!("Failed to upload asset: {}", e);
            HttpResponse::from(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    put,
    path = "/assets/{id}",
    request_body(content = inline(crate::asset::models::ReplaceAssetRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Asset content replaced, id unchanged", body = crate::asset::models::Asset),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "ID of the asset to replace")
    )
)]
pub async fn replace_asset(
    id: Path<Uuid>,
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    let asset_id = id.into_inner();
    info!("Executing replace_asset handler for ID: {}", asset_id);
    let parsed = match parse_asset_multipart(payload, &data.spool_dir).await {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Failed during replace multipart parsing: {}", e);
            return HttpResponse::from(e);
        }
    };

    match data
        .store
        .replace(
            asset_id,
            BlobPayload::Spooled(parsed.spooled),
            parsed.content_type,
        )
        .await
    {
        Ok(asset) => {
            info!("Asset {} content replaced.", asset.id);
            data.invalidate_sections();
            HttpResponse::Ok().json(asset)
        }
        Err(e) => {
            error!("Failed to replace asset {}: {}", asset_id, e);
            HttpResponse::from(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    patch,
    path = "/assets/{id}/order",
    request_body = PatchOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = crate::asset::models::Asset),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "ID of the asset to reorder")
    )
)]
pub async fn patch_asset_order(
    id: Path<Uuid>,
    req: Json<PatchOrderRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let asset_id = id.into_inner();
    info!(
        "Executing patch_asset_order handler for ID: {} (order {})",
        asset_id, req.order
    );
    match data.store.patch_order(asset_id, req.order).await {
        Ok(asset) => {
            data.invalidate_sections();
            HttpResponse::Ok().json(asset)
        }
        Err(e) => {
            error!("Failed to patch order for asset {}: {}", asset_id, e);
            HttpResponse::from(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    post,
    path = "/assets/reorder",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Assets renumbered in the given sequence", body = [crate::asset::models::Asset]),
        (status = 404, description = "One of the ids does not exist", body = ErrorResponse)
    )
)]
pub async fn reorder_assets(
    req: Json<ReorderRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    info!(
        "Executing reorder_assets handler for {} ids",
        req.ids.len()
    );
    match data.store.reorder(&req.ids).await {
        Ok(assets) => {
            data.invalidate_sections();
            HttpResponse::Ok().json(assets)
        }
        Err(e) => {
            // Patches already applied stay applied; order is a display hint
            // and the next successful reorder heals the section.
            error!("Reorder failed part-way: {}", e);
            HttpResponse::from(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    delete,
    path = "/assets/{id}",
    responses(
        (status = 204, description = "Asset deleted successfully"),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "ID of the asset to delete")
    )
)]
pub async fn delete_asset(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    let asset_id = id.into_inner();
    info!("Executing delete_asset handler for ID: {}", asset_id);
    // No reference check against services or blog posts: a deleted asset
    // still referenced elsewhere 404s at render time.
    match data.store.delete(asset_id).await {
        Ok(()) => {
            info!("Asset {} deleted from catalog and blob storage.", asset_id);
            data.invalidate_sections();
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            error!("Failed to delete asset {}: {}", asset_id, e);
            HttpResponse::from(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    get,
    path = "/assets/{id}",
    responses(
        (status = 200, description = "Asset found", body = crate::asset::models::Asset),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "ID of the asset to retrieve")
    )
)]
pub async fn get_asset_by_id(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    let asset_id = id.into_inner();
    info!("Executing get_asset_by_id handler for ID: {}", asset_id);
    match data.store.get_by_id(asset_id) {
        Ok(asset) => HttpResponse::Ok().json(asset),
        Err(e) => {
            error!("Asset not found for ID: {}", asset_id);
            HttpResponse::from(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    get,
    path = "/assets/slug/{slug}",
    responses(
        (status = 200, description = "Asset found", body = crate::asset::models::Asset),
        (status = 404, description = "No asset carries this slug", body = ErrorResponse)
    ),
    params(
        ("slug" = String, Path, description = "Slug of the asset to retrieve")
    )
)]
pub async fn get_asset_by_slug(slug: Path<String>, data: web::Data<AppState>) -> impl Responder {
    let slug = slug.into_inner();
    info!("Executing get_asset_by_slug handler for slug: {}", slug);
    match data.store.get_by_slug(&slug) {
        Ok(asset) => HttpResponse::Ok().json(asset),
        Err(e) => {
            error!("No asset found for slug: {}", slug);
            HttpResponse::from(e)
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Asset Store",
    get,
    path = "/assets/section/{section}",
    responses(
        (status = 200, description = "Assets in the section, ordered", body = [crate::asset::models::Asset])
    ),
    params(
        ("section" = String, Path, description = "Logical placement key, e.g. hero-home"),
        ListSectionQuery
    )
)]
pub async fn list_section_assets(
    section: Path<String>,
    query: Query<ListSectionQuery>,
    data: web::Data<AppState>,
) -> impl Responder {
    let section = section.into_inner();
    info!(
        "Executing list_section_assets handler for section '{}' (kind {:?})",
        section, query.kind
    );
    let assets = data.cached_section(&section, query.kind).await;
    HttpResponse::Ok().json(assets)
}

#[utoipa::path(
    tag = "Asset Store",
    get,
    path = "/assets/content/{id}",
    responses(
        (status = 200, description = "Raw asset content, streamed with the stored content type", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "ID of the asset whose content to stream")
    )
)]
pub async fn serve_asset_content(id: Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    let asset_id = id.into_inner();
    info!(
        "Executing serve_asset_content handler for ID: {}",
        asset_id
    );
    match data.store.read_content(asset_id).await {
        Ok((asset, content)) => {
            debug!(
                "Streaming {} bytes of {} for asset {}",
                content.len, asset.content_type, asset_id
            );
            HttpResponse::Ok()
                .content_type(asset.content_type.clone())
                .no_chunking(content.len)
                .streaming(content.stream)
        }
        Err(e) => {
            error!("Failed to serve content for asset {}: {}", asset_id, e);
            HttpResponse::from(e)
        }
    }
}
