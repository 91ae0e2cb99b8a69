use anyhow::{Context, Result};
use image::RgbImage;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

/// Anything that can hand out still frames for the capture flow.
///
/// The live [`Camera`] is the production implementation; tests substitute a
/// canned source so the flow can run without a video device.
pub trait FrameSource {
    fn grab(&mut self) -> Result<RgbImage>;
}

/// A v4l capture device with an mmap'd buffer stream.
///
/// The stream (and with it the kernel buffers) is released when the value is
/// dropped, so holding a `Camera` is the same as holding the device.
pub struct Camera {
    stream: Stream<'static>,
    width: u32,
    height: u32,
    fourcc: FourCC,
}

impl Camera {
    /// Open `device` (e.g. `/dev/video0`) and negotiate a pixel format.
    ///
    /// Preference order is packed RGB, then YUYV, then whatever the driver
    /// already reports; GREY is also handled at read time.
    pub fn open(device: &str) -> Result<Self> {
        let dev =
            Device::with_path(device).with_context(|| format!("opening video device {device}"))?;
        let mut fmt = dev.format().context("querying device format")?;
        for candidate in [FourCC::new(b"RGB3"), FourCC::new(b"YUYV")] {
            if fmt.fourcc == candidate {
                break;
            }
            let wanted = Format::new(fmt.width, fmt.height, candidate);
            fmt = dev.set_format(&wanted).unwrap_or(fmt);
            if fmt.fourcc == candidate {
                break;
            }
        }
        log::info!(
            "camera {} ready: {}x{} {:?}",
            device,
            fmt.width,
            fmt.height,
            fmt.fourcc
        );
        let stream =
            Stream::with_buffers(&dev, Type::VideoCapture, 4).context("starting capture stream")?;
        Ok(Self {
            stream,
            width: fmt.width,
            height: fmt.height,
            fourcc: fmt.fourcc,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_rgb(&mut self) -> Result<Vec<u8>> {
        let (data, meta) = self.stream.next().context("dequeuing frame")?;
        log::debug!(
            "frame seq={} len={} fourcc={:?}",
            meta.sequence,
            data.len(),
            self.fourcc
        );
        let rgb = match self.fourcc {
            f if f == FourCC::new(b"RGB3") => data.to_vec(),
            f if f == FourCC::new(b"YUYV") => yuyv_to_rgb(self.width, self.height, data)?,
            f if f == FourCC::new(b"GREY") => grey_to_rgb(self.width, self.height, data)?,
            other => {
                log::warn!("unhandled pixel format {:?}, passing buffer through", other);
                data.to_vec()
            }
        };
        let expected = (self.width * self.height * 3) as usize;
        if rgb.len() < expected {
            anyhow::bail!(
                "short frame: {} bytes, expected {} ({:?})",
                rgb.len(),
                expected,
                self.fourcc
            );
        }
        Ok(rgb)
    }
}

impl FrameSource for Camera {
    fn grab(&mut self) -> Result<RgbImage> {
        let mut rgb = self.read_rgb()?;
        rgb.truncate((self.width * self.height * 3) as usize);
        RgbImage::from_raw(self.width, self.height, rgb).ok_or_else(|| {
            anyhow::anyhow!("frame buffer does not match {}x{}", self.width, self.height)
        })
    }
}

fn yuyv_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height * 2) as usize;
    if data.len() < expected {
        anyhow::bail!("short YUYV buffer: {} < {}", data.len(), expected);
    }
    let mut out = Vec::with_capacity((width * height * 3) as usize);
    for chunk in data[..expected].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        for &y in &[chunk[0], chunk[2]] {
            let y = y as f32;
            out.push(clamp(y + 1.402 * v));
            out.push(clamp(y - 0.344136 * u - 0.714136 * v));
            out.push(clamp(y + 1.772 * u));
        }
    }
    Ok(out)
}

fn grey_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height) as usize;
    if data.len() < expected {
        anyhow::bail!("short GREY buffer: {} < {}", data.len(), expected);
    }
    let mut out = Vec::with_capacity(expected * 3);
    for &y in &data[..expected] {
        out.extend_from_slice(&[y, y, y]);
    }
    Ok(out)
}

fn clamp(v: f32) -> u8 {
    v.max(0.0).min(255.0) as u8
}
