//! `scormdeck download <course-id>` - cache a course locally.

use indicatif::{ProgressBar, ProgressStyle};

use scormdeck::config::ConfigFile;

use crate::error::CliError;

use super::build_player;

pub async fn run(config: &ConfigFile, course_id: &str) -> Result<(), CliError> {
    let player = build_player(config)?;

    if player.is_installed(course_id).await? {
        println!("Course {} is already cached.", course_id);
        return Ok(());
    }

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("downloading");

    let progress_bar = bar.clone();
    let record = player
        .ensure_course(
            course_id,
            Some(Box::new(move |percent| {
                progress_bar.set_position(percent as u64);
            })),
        )
        .await?;

    bar.finish_with_message("done");
    println!(
        "Cached {} ({}) - SCORM {}, launches {}",
        record.course.name, record.course.id, record.manifest.version, record.manifest.launch_url
    );
    Ok(())
}
