// ============================================================================
// screenshot.rs — Sim Engine
// Frame capture: copy the presented texture to a staging buffer, read it back,
// and write it out as PNG.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

pub const SCREENSHOT_DIR: &str = "screenshots";

/// Rounds a tightly packed RGBA row up to wgpu's copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let unpadded = width * 4;
    unpadded.div_ceil(align) * align
}

/// Strip row padding and, for BGRA surfaces, swap to RGBA.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_bpr: u32, bgra: bool) -> Vec<u8> {
    let row_len = (width * 4) as usize;
    let mut rgba = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * padded_bpr as usize;
        let row_data = &data[start..start + row_len];
        if bgra {
            for chunk in row_data.chunks_exact(4) {
                rgba.extend_from_slice(&[chunk[2], chunk[1], chunk[0], chunk[3]]);
            }
        } else {
            rgba.extend_from_slice(row_data);
        }
    }
    rgba
}

/// A copy of one frame waiting in a mappable buffer.
pub struct PendingCapture {
    staging: wgpu::Buffer,
    padded_bpr: u32,
    width: u32,
    height: u32,
    bgra: bool,
}

impl PendingCapture {
    /// Record a copy of `texture` into a new staging buffer. The surface must
    /// have been configured with `COPY_SRC`.
    pub fn encode(
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
    ) -> Self {
        let width = texture.width();
        let height = texture.height();
        let padded_bpr = padded_bytes_per_row(width);

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("screenshot_staging"),
            size: (padded_bpr * height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bpr),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let bgra = matches!(
            texture.format(),
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );

        Self {
            staging,
            padded_bpr,
            width,
            height,
            bgra,
        }
    }

    /// Block until the copy lands and return tightly packed RGBA pixels.
    /// Call after the encoder holding the copy has been submitted.
    pub fn read_back(self, device: &wgpu::Device) -> Result<(u32, u32, Vec<u8>), String> {
        let slice = self.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(format!("Failed to map screenshot buffer: {}", e)),
            Err(e) => return Err(format!("Screenshot readback dropped: {}", e)),
        }

        let rgba = {
            let data = slice.get_mapped_range();
            unpad_rows(&data, self.width, self.height, self.padded_bpr, self.bgra)
        };
        self.staging.unmap();
        Ok((self.width, self.height, rgba))
    }
}

/// Write `rgba` as `frameNNNNNN_<timestamp>.png` under `dir`.
pub fn save_screenshot(
    dir: &Path,
    frame: u64,
    width: u32,
    height: u32,
    rgba_data: &[u8],
) -> Result<PathBuf, String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create screenshots dir: {}", e))?;

    let filename = format!(
        "frame{:06}_{}.png",
        frame,
        Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(filename);

    image::save_buffer(&path, rgba_data, width, height, image::ColorType::Rgba8)
        .map_err(|e| format!("Failed to save screenshot: {}", e))?;

    log::info!("Screenshot saved: {:?}", path);
    Ok(path)
}
