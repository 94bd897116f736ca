use std::path::PathBuf;

use crate::buffer::display::DisplayBuffer;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FramefoldError, FramefoldResult};
use crate::present::sink::{PresentSink, SinkConfig};

/// Sink that keeps the latest presented frame and writes it as a PNG on `end`.
#[derive(Debug)]
pub struct PngSink {
    out_path: PathBuf,
    last: Option<(FrameIndex, DisplayBuffer)>,
}

impl PngSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            last: None,
        }
    }
}

impl PresentSink for PngSink {
    fn begin(&mut self, cfg: SinkConfig) -> FramefoldResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(FramefoldError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        self.last = None;
        Ok(())
    }

    fn present(&mut self, idx: FrameIndex, frame: &DisplayBuffer) -> FramefoldResult<()> {
        match &mut self.last {
            Some((last_idx, last)) => {
                *last_idx = idx;
                last.clone_from(frame);
            }
            None => self.last = Some((idx, frame.clone())),
        }
        Ok(())
    }

    fn end(&mut self) -> FramefoldResult<()> {
        let Some((idx, frame)) = self.last.take() else {
            return Err(FramefoldError::present("png sink received no frames"));
        };

        if let Some(parent) = self.out_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                FramefoldError::present(format!(
                    "create output dir '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        image::save_buffer_with_format(
            &self.out_path,
            frame.as_bytes(),
            frame.width(),
            frame.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            FramefoldError::present(format!(
                "write png '{}': {e}",
                self.out_path.display()
            ))
        })?;

        tracing::info!(frame = idx.0, path = %self.out_path.display(), "wrote png");
        Ok(())
    }
}
