use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use taskd_db::{Database, SqliteTaskRepository, SqliteUserRepository};
use taskd_http::{ApiServer, JwtKeys};
use tracing::info;

use crate::config::Config;

/// Open the database and bring the schema up to date
pub async fn create_database(config: &Config) -> Result<Arc<Database>> {
    let database_url = config.database_url();
    info!("Using database URL: {}", database_url);

    let db = Arc::new(
        Database::from_url(&database_url)
            .with_context(|| format!("Failed to open database at {database_url}"))?,
    );

    info!("Running database migrations");
    db.migrate()
        .await
        .context("Failed to run database migrations")?;

    Ok(db)
}

/// Create and configure the API server over the shared database
pub fn create_server(config: &Config, db: Arc<Database>) -> ApiServer {
    ApiServer::new(
        Arc::new(SqliteTaskRepository::new(db.clone())),
        Arc::new(SqliteUserRepository::new(db)),
        JwtKeys::new(config.auth.secret.as_bytes(), config.token_ttl()),
    )
}

/// Initialize the complete application
pub async fn initialize_app(config: &Config) -> Result<ApiServer> {
    info!("Initializing application");

    let db = create_database(config)
        .await
        .context("Failed to create database")?;

    let server = create_server(config, db);

    info!("Application initialized successfully");
    Ok(server)
}

/// Ensure the database directory exists using config
pub fn ensure_database_directory_from_config(config: &Config) -> Result<()> {
    let database_url = config.database_url();
    ensure_database_directory(&database_url)
}

/// Ensure the database directory exists and set secure permissions
pub fn ensure_database_directory(database_url: &str) -> Result<()> {
    // In-memory databases have no backing file
    if matches!(
        database_url,
        ":memory:" | "sqlite::memory:" | "sqlite://:memory:"
    ) {
        return Ok(());
    }

    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let db_path = Path::new(path);

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory: {}", parent.display());
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;

            // Set secure permissions on Unix systems (owner only)
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let permissions = std::fs::Permissions::from_mode(0o700);
                std::fs::set_permissions(parent, permissions)
                    .context("Failed to set directory permissions")?;
            }
        }
    }

    // Set secure permissions on database file if it exists
    if db_path.exists() {
        set_secure_file_permissions(db_path)?;
    }

    Ok(())
}

/// Set secure file permissions (owner-only access on Unix)
fn set_secure_file_permissions(file_path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file_path, permissions)
            .with_context(|| format!("Failed to set permissions for {}", file_path.display()))?;
        info!(
            "Set secure permissions (0600) for database file: {}",
            file_path.display()
        );
    }

    #[cfg(windows)]
    {
        // On Windows the file inherits NTFS permissions from the directory
        info!(
            "Database file permissions managed by system on Windows: {}",
            file_path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(database_url: String) -> Config {
        let mut config = Config::default();
        config.database.url = Some(database_url);
        config
    }

    #[tokio::test]
    async fn test_initialize_app_with_file_database() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("setup_test.db");
        let config = test_config(format!("sqlite://{}", db_path.display()));

        let server = initialize_app(&config).await;
        assert!(server.is_ok(), "initialize_app failed: {:?}", server.err());
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_create_database_runs_migrations() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("migrated.db");
        let config = test_config(format!("sqlite://{}", db_path.display()));

        let db = create_database(&config).await.unwrap();

        // The schema is in place when a repository query succeeds
        use taskd_core::repository::TaskRepository;
        let repo = SqliteTaskRepository::new(db);
        let tasks = repo.get_all().await.unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_ensure_database_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("subdir").join("test.db");
        let database_url = format!("sqlite://{}", db_path.display());

        let result = ensure_database_directory(&database_url);
        assert!(result.is_ok());
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn test_ensure_database_directory_skips_memory() {
        assert!(ensure_database_directory(":memory:").is_ok());
        assert!(ensure_database_directory("sqlite::memory:").is_ok());
    }
}
