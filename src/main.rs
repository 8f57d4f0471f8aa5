#[actix_web::main]
async fn main() -> std::io::Result<()> {
    lonier_media_server::run().await
}
