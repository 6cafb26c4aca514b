//! Inspect command implementation.
//!
//! Parses and classifies a single NFO file without touching the remote
//! library, for checking what the engine would see.

use crate::core::{classifier, scanner};
use crate::models::record::NfoRecord;
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn inspect(nfo: &Path) -> Result<()> {
    let classified = classifier::classify_file(nfo)?;
    let record = &classified.record;
    let common = record.common();

    println!("{} {}", "File:".bold(), nfo.display());
    println!("{} {}", "Kind:".bold(), record.kind_name());
    println!("{} {}", "Title:".bold(), common.title);
    if let Some(original) = &common.original_title {
        println!("{} {}", "Original title:".bold(), original);
    }
    if let Some(year) = common.year {
        println!("{} {}", "Year:".bold(), year);
    }
    if let Some(rating) = common.rating {
        println!("{} {rating:.1}", "Rating:".bold());
    }
    if let Some(plot) = &common.plot {
        println!("{} {}", "Plot:".bold(), plot);
    }

    match record {
        NfoRecord::Show {
            studio,
            mpaa,
            genres,
            named_seasons,
            actors,
            ..
        } => {
            if let Some(studio) = studio {
                println!("{} {}", "Studio:".bold(), studio);
            }
            if let Some(mpaa) = mpaa {
                println!("{} {}", "MPAA:".bold(), mpaa);
            }
            if !genres.is_empty() {
                println!("{} {}", "Genres:".bold(), genres.join(", "));
            }
            for (number, name) in named_seasons {
                println!("{} {number}: {name}", "Named season".bold());
            }
            for actor in actors {
                match &actor.role {
                    Some(role) => println!("{} {} as {}", "Actor:".bold(), actor.name, role),
                    None => println!("{} {}", "Actor:".bold(), actor.name),
                }
            }
        }
        NfoRecord::Season {
            season_number,
            episode_count,
            ..
        } => {
            println!("{} {season_number}", "Season:".bold());
            if let Some(count) = episode_count {
                println!("{} {count}", "Episode count:".bold());
            }
        }
        NfoRecord::Episode {
            season_number,
            episode_number,
            ..
        } => {
            println!(
                "{} S{season_number:02}E{episode_number:02}",
                "Episode:".bold()
            );
        }
        NfoRecord::Movie { .. } => {}
    }

    if let Some(ctx) = &classified.context {
        match ctx.show_year {
            Some(year) => println!("{} {} ({year})", "Owning show:".bold(), ctx.show_title),
            None => println!("{} {}", "Owning show:".bold(), ctx.show_title),
        }
    }

    match scanner::sibling_image(nfo) {
        Some(image) => println!("{} {}", "Poster:".bold(), image.display()),
        None => println!("{} none", "Poster:".bold()),
    }

    Ok(())
}
