use crate::recognition::{ImageAnalysis, Prediction};
use std::fmt::Display;
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;

/// 控制台输出，写入任意 `Write`（二进制中为stdout，测试中为 `Vec<u8>`）
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "🚀 Starting AI Object Recognition System")?;
        self.rule('=')
    }

    pub fn model_loading(&mut self) -> io::Result<()> {
        writeln!(self.out, "🤖 Initializing AI Object Recognition System...")?;
        writeln!(self.out, "📦 Loading MobileNetV2 model...")?;
        self.out.flush()
    }

    pub fn model_loaded(&mut self) -> io::Result<()> {
        writeln!(self.out, "✅ Model loaded successfully!")
    }

    pub fn no_images(&mut self) -> io::Result<()> {
        writeln!(self.out, "❌ No images found in the folder!")
    }

    pub fn found_images(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "🗂️  Found {} image(s)", count)?;
        self.rule('=')
    }

    /// 单张图像的完整输出块
    pub fn image(&mut self, index: usize, total: usize, analysis: &ImageAnalysis) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "📸 Image {}/{}: {}", index, total, analysis.image_name)?;
        self.rule('-')?;

        match &analysis.predictions {
            Some(predictions) => self.predictions(predictions)?,
            None => {
                let reason = analysis.error.as_deref().unwrap_or("no predictions");
                writeln!(self.out, "❌ Error processing {}: {}", analysis.image_name, reason)?;
            }
        }

        self.out.flush()
    }

    fn predictions(&mut self, predictions: &[Prediction]) -> io::Result<()> {
        writeln!(self.out, "⏳ Analysis complete!")?;
        writeln!(self.out, "📊 Top predictions:")?;

        for (rank, prediction) in predictions.iter().enumerate() {
            writeln!(
                self.out,
                "   {} {}. {}: {:.4} ({:.2}%)",
                prediction.tier().marker(),
                rank + 1,
                prediction.display_label(),
                prediction.score,
                prediction.percentage()
            )?;
        }

        Ok(())
    }

    pub fn summary(&mut self, processed: usize) -> io::Result<()> {
        writeln!(self.out)?;
        self.rule('=')?;
        writeln!(
            self.out,
            "🎉 Analysis complete! Processed {} image(s) successfully!",
            processed
        )
    }

    pub fn interrupted(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "⏹️  Process interrupted by user")
    }

    pub fn fatal(&mut self, error: impl Display) -> io::Result<()> {
        writeln!(self.out, "❌ An error occurred: {}", error)
    }

    pub fn farewell(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "🔚 Thank you for using AI Object Recognition System!")?;
        self.out.flush()
    }

    fn rule(&mut self, ch: char) -> io::Result<()> {
        writeln!(self.out, "{}", ch.to_string().repeat(RULE_WIDTH))
    }
}
