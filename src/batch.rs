// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Context, Error};
use clap::Args;
use rayon::prelude::*;
use tile_unscramble::page::{PageData, PageImage};
use tile_unscramble::{descramble_tile, host_transform, RasterImage, DEFAULT_SLICE_SIZE};

use crate::{open_image, save_raster};

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Page metadata: JSON, or page script containing `_pdata_ = {...}`
    metadata: PathBuf,

    /// Directory holding the scrambled images
    #[arg(short = 'i', long)]
    images: PathBuf,

    /// Output directory
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Tile size
    #[arg(short = 's', long, default_value_t = DEFAULT_SLICE_SIZE)]
    slice_size: usize,

    /// Output file extension
    #[arg(long, default_value = "jpg")]
    extension: String,

    /// Skip images that fail instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

fn load_page(args: &BatchArgs) -> Result<PageData, Error> {
    let text = fs::read_to_string(&args.metadata)
        .with_context(|| format!("reading {}", args.metadata.display()))?;

    let page = if text.trim_start().starts_with('{') {
        PageData::from_json(&text)?
    } else {
        PageData::from_script(&text)?
    };
    Ok(page)
}

/// Decode, rebuild and write image `index`.
fn process(index: usize, entry: &PageImage, args: &BatchArgs) -> Result<(), Error> {
    let seed = entry.seed(host_transform())?;

    let input = args.images.join(entry.file_name());
    let raster = RasterImage::from_dynamic(open_image(&input)?)?;
    let out = descramble_tile(raster, args.slice_size, &seed)?;

    save_raster(out, &args.output.join(format!("{index}.{}", args.extension)))
}

pub fn run(args: BatchArgs) -> Result<(), Error> {
    let page = load_page(&args)?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()?;
    }
    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let total = page.len();
    log::info!("{:?}: {total} images", page.title);

    let done = AtomicUsize::new(0);
    let step = |(index, entry): (usize, &PageImage)| {
        let ret = process(index, entry, &args)
            .with_context(|| format!("image {index} ({})", entry.locator()));
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("{n}/{total}");
        ret
    };

    if args.keep_going {
        let failed: usize = page
            .img
            .par_iter()
            .enumerate()
            .map(|item| match step(item) {
                Ok(()) => 0,
                Err(e) => {
                    log::warn!("skipped: {e:#}");
                    1
                }
            })
            .sum();

        if failed > 0 {
            bail!("{failed} of {total} images failed");
        }
    } else {
        page.img.par_iter().enumerate().try_for_each(step)?;
    }

    log::info!("wrote {total} images to {}", args.output.display());
    Ok(())
}
