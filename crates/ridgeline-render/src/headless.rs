//! Offscreen terrain frames rendered without a window

use ridgeline_terrain::{DrawStats, GeoMipGrid, RenderMode};

use crate::camera::Camera;
use crate::context::RenderError;
use crate::renderer::{RendererConfig, TerrainRenderer};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const BYTES_PER_PIXEL: u32 = 4;

/// A terrain renderer bound to its own device and a fixed-size color and
/// depth target. Each frame can be captured as an image.
pub struct OffscreenTerrain {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: TerrainRenderer,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl OffscreenTerrain {
    /// Acquire a device and upload `grid` for `width × height` frames
    pub async fn new(
        grid: &GeoMipGrid,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        let (device, queue) = request_device().await?;

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = frame_texture(
            &device,
            "Terrain Frame Color",
            extent,
            COLOR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let depth = frame_texture(
            &device,
            "Terrain Frame Depth",
            extent,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let color_view = color.create_view(&Default::default());
        let depth_view = depth.create_view(&Default::default());

        let renderer = TerrainRenderer::new(&device, COLOR_FORMAT, grid, config);

        Ok(Self {
            device,
            queue,
            renderer,
            color,
            color_view,
            depth_view,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.color.width(), self.color.height())
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.size();
        width as f32 / height as f32
    }

    /// Update LODs for `camera` and draw the terrain into the frame
    pub fn render(&self, camera: &Camera, grid: &mut GeoMipGrid, mode: RenderMode) -> DrawStats {
        self.renderer.render_to(
            &self.device,
            &self.queue,
            &self.color_view,
            &self.depth_view,
            camera,
            grid,
            mode,
        )
    }

    /// Copy the last rendered frame back to the CPU
    pub fn capture(&self) -> Result<image::RgbaImage, RenderError> {
        let (width, height) = self.size();
        let row_bytes = padded_row_bytes(width);

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Terrain Frame Readback"),
            size: row_bytes as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Terrain Frame Capture"),
            });
        encoder.copy_texture_to_buffer(
            self.color.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(row_bytes),
                    rows_per_image: Some(height),
                },
            },
            self.color.size(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::sync_channel(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?;

        let image = unpad_rows(&slice.get_mapped_range(), width, height, row_bytes);
        staging.unmap();
        image.ok_or(RenderError::ImageSize { width, height })
    }

    /// Release the frame's GPU resources
    pub fn destroy(self) {
        self.renderer.destroy();
        self.color.destroy();
    }
}

async fn request_device() -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await
        .ok_or(RenderError::AdapterNotFound)?;

    let info = adapter.get_info();
    log::info!("Rendering terrain on {} ({:?})", info.name, info.backend);

    adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Ridgeline Terrain Device"),
                ..Default::default()
            },
            None,
        )
        .await
        .map_err(|e| RenderError::DeviceCreation(e.to_string()))
}

fn frame_texture(
    device: &wgpu::Device,
    label: &str,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

/// Bytes per readback row: texture copies align rows to 256 bytes
fn padded_row_bytes(width: u32) -> u32 {
    wgpu::util::align_to(width * BYTES_PER_PIXEL, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

fn unpad_rows(data: &[u8], width: u32, height: u32, row_bytes: u32) -> Option<image::RgbaImage> {
    let pixels = data
        .chunks(row_bytes as usize)
        .take(height as usize)
        .flat_map(|row| row.iter().take((width * BYTES_PER_PIXEL) as usize))
        .copied()
        .collect();
    image::RgbaImage::from_raw(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readback_rows_are_copy_aligned() {
        assert_eq!(padded_row_bytes(64), 256);
        assert_eq!(padded_row_bytes(1), 256);
        assert_eq!(padded_row_bytes(257), 1280);
    }

    #[test]
    fn unpadded_rows_form_the_image() {
        // two 1-pixel rows, each padded to 8 bytes
        let data = [1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0];
        let img = unpad_rows(&data, 1, 2, 8).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 4]);
        assert_eq!(img.get_pixel(0, 1).0, [5, 6, 7, 8]);
    }

    #[test]
    fn short_readback_is_rejected() {
        assert!(unpad_rows(&[0; 8], 2, 2, 8).is_none());
    }
}
