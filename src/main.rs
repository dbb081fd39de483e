use anyhow::bail;
use clap::{command, Arg};
use std::path::PathBuf;

mod frontmatter;
mod generator;
mod index;
mod markdown;
mod renderer;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = command!()
        .arg(
            Arg::new("markdown_dir")
                .help("Directory containing markdown posts")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("posts/markdown"),
        )
        .arg(
            Arg::new("posts_dir")
                .help("Directory where generated pages and index.json are written")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("posts"),
        )
        .get_matches();

    let markdown_dir: &PathBuf = matches.get_one("markdown_dir").unwrap();
    let posts_dir: &PathBuf = matches.get_one("posts_dir").unwrap();
    if posts_dir.exists() && !posts_dir.is_dir() {
        bail!("if posts_dir exists, it must be a directory.");
    }

    let handlebars = renderer::generate_renderer()?;
    generator::generate(markdown_dir, posts_dir, &handlebars)?;

    Ok(())
}
