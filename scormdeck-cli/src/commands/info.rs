//! `scormdeck info <course-id>` - inspect a cached course.

use scormdeck::config::ConfigFile;
use scormdeck::pipeline::PipelineError;
use scormdeck::player::PlayerError;
use scormdeck::store::StoreError;

use crate::error::CliError;

use super::build_player;

pub async fn run(config: &ConfigFile, course_id: &str) -> Result<(), CliError> {
    let player = build_player(config)?;

    let record = match player.course_record(course_id).await {
        Ok(record) => record,
        Err(PlayerError::Pipeline(PipelineError::Storage(StoreError::NotFound(_)))) => {
            println!("Course {} is not cached. Run `scormdeck download {}`.", course_id, course_id);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{} ({})", record.course.name, record.course.id);
    if !record.course.description.is_empty() {
        println!("  {}", record.course.description);
    }
    println!("  category:     {}", record.course.category);
    println!("  SCORM:        {}", record.manifest.version);
    println!("  title:        {}", record.manifest.title);
    println!("  launch:       {}", record.manifest.launch_url);
    if !record.manifest.prerequisites.is_empty() {
        println!("  prerequisites: {}", record.manifest.prerequisites.join(", "));
    }
    println!("  uploaded:     {}", record.course.uploaded_at.format("%Y-%m-%d %H:%M"));
    println!("  installed:    {}", record.installed_at.format("%Y-%m-%d %H:%M"));
    Ok(())
}
