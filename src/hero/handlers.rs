use actix_web::{web, HttpResponse, Responder};
use log::info;

use crate::asset::models::MediaKind;
use crate::hero::{aggregate, HERO_SECTION};
use crate::state::AppState;

#[utoipa::path(
    context_path = "/api",
    tag = "Hero",
    get,
    path = "/hero",
    responses(
        (status = 200, description = "Ordered hero slider sequence, primary video first", body = [crate::hero::HeroSlide])
    )
)]
pub async fn get_hero_slides(data: web::Data<AppState>) -> impl Responder {
    info!("Executing get_hero_slides handler");
    let images = data.cached_section(HERO_SECTION, Some(MediaKind::Image)).await;
    let videos = data.cached_section(HERO_SECTION, Some(MediaKind::Video)).await;
    let slides = aggregate(
        images,
        videos,
        &data.config.primary_hero_slug,
        data.config.hero_fallback_url.as_deref(),
    );
    HttpResponse::Ok().json(slides)
}
