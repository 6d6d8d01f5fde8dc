//! Terminal presenter that draws each scene as a block of characters.

use std::io::Write;

use anyhow::{Context, Result};
use room_crawl_core::CellCoord;
use room_crawl_rendering::{Presenter, Scene, SpriteKey};

const FLOOR: char = '.';

fn glyph(key: SpriteKey) -> char {
    match key {
        SpriteKey::Player => '@',
        SpriteKey::Enemy => 'E',
        SpriteKey::Wall => '#',
        SpriteKey::Door => '+',
        SpriteKey::OpenDoor => '/',
        SpriteKey::Opening => ' ',
        SpriteKey::Hill => '^',
        SpriteKey::Sword => '!',
    }
}

/// Writes one line per grid row followed by a blank separator line.
#[derive(Debug)]
pub(crate) struct AsciiPresenter<W> {
    out: W,
}

impl<W: Write> AsciiPresenter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    pub(crate) fn writer(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Presenter for AsciiPresenter<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        for row in 0..scene.grid.rows {
            let line: String = (0..scene.grid.columns)
                .map(|column| {
                    scene
                        .sprite_at(CellCoord::new(column, row))
                        .map_or(FLOOR, |sprite| glyph(sprite.key))
                })
                .collect();
            writeln!(self.out, "{line}").context("failed to write frame")?;
        }
        writeln!(self.out).context("failed to write frame")?;
        Ok(())
    }
}
