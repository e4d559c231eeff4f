use persistence::{default_sqlite_url, FileStore};

/// Prepare the SQLite save database and, when a file save exists in
/// `./saves`, copy it into the `default` slot.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = default_sqlite_url();
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"));
    if let Some(path) = path {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        // touch file to ensure it exists
        let _ = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .append(true)
            .open(path)?;
    }
    let pool = persistence::init_db(url).await?;
    let id = persistence::create_save(&pool, "default", Some("initialized")).await?;

    let mut files = FileStore::open("./saves")?;
    if let Some(world) = persistence::load_world(&mut files)? {
        persistence::write_world(&pool, "default", &world).await?;
        println!("Copied week {} save into slot {id}", world.week);
    }
    println!("DB migrated at {}", url);
    Ok(())
}
