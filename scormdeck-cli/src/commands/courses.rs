//! `scormdeck courses` - list the catalog.

use scormdeck::catalog::CourseCatalog;
use scormdeck::config::ConfigFile;

use crate::error::CliError;

use super::{build_catalog, build_player};

pub async fn run(config: &ConfigFile) -> Result<(), CliError> {
    let catalog = build_catalog(config)?;
    let player = build_player(config)?;

    let courses = catalog.list_courses().await?;
    if courses.is_empty() {
        println!("No courses in the catalog at {}.", config.backend.origin);
        return Ok(());
    }

    println!("{:<20} {:<12} {:<30} uploaded", "ID", "STATUS", "NAME");
    for course in courses {
        let status = if player.is_installed(&course.id).await? {
            "cached"
        } else {
            "remote"
        };
        println!(
            "{:<20} {:<12} {:<30} {}",
            course.id,
            status,
            course.name,
            course.uploaded_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
