//! `scormdeck remove <course-id>` - delete a cached course.

use scormdeck::config::ConfigFile;

use crate::error::CliError;

use super::build_player;

pub async fn run(config: &ConfigFile, course_id: &str) -> Result<(), CliError> {
    let player = build_player(config)?;

    if !player.is_installed(course_id).await? {
        println!("Course {} is not cached; nothing to remove.", course_id);
        return Ok(());
    }

    player.remove_course(course_id).await?;
    println!("Removed cached course {}.", course_id);
    Ok(())
}
