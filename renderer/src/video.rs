// nvfx/renderer/src/video.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Textured video: scaling YV12 frames onto a pixmap with the 3D engine.
//!
//! Three texture units are bound. Unit 0 holds the bicubic filter table, unit 1 the luma plane
//! and unit 2 the interleaved chroma plane at half resolution. The fragment program does the
//! colour conversion.

use crate::accel::{Accel, FilterTableBuffer};
use crate::blend::BlendState;
use crate::error::{AttributeError, VideoError};
use crate::filter::{self, FILTER_TABLE_BUFFER_SIZE, FILTER_TABLE_ENTRIES};
use crate::gen::{Family, MAX_TEXTURE_SIZE};
use crate::picture::Pixmap;
use crate::regs::{self, TEX_SWIZZLE_S0_S1 as S1, TEX_SWIZZLE_S1_W as W};
use crate::regs::{TEX_SWIZZLE_S1_X as X, TEX_SWIZZLE_S1_Y as Y, TEX_SWIZZLE_S1_Z as Z};
use crate::shaders::{self, VideoProgramId};
use nvfx_geometry::rect::{RectI, RectX};
use nvfx_geometry::vector::Vector2I;
use nvfx_gpu::{Allocator, BufferFlags, BufferObject, PushBuffer, Reloc, RelocFlags};

const PUT_IMAGE_PUSH_SPACE: usize = 128;
const CLIP_BOX_PUSH_SPACE: usize = 64;

const ATTR_POSITION: u16 = 0;
const ATTR_TEXCOORD: u16 = 8;

/// Per-port video state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoPort {
    pub sync_to_vblank: bool,
    /// Whether bicubic filtering is used when the scale factor allows it.
    pub bicubic: bool,
}

/// A port attribute, as named by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortAttribute {
    SyncToVBlank,
    /// Resets every settable attribute.
    SetDefaults,
    /// Any attribute this backend does not know.
    Other(u32),
}

/// A decoded YV12 frame in a buffer object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoFrame {
    pub bo: BufferObject,
    pub luma_offset: u32,
    /// The interleaved chroma plane.
    pub chroma_offset: u32,
    pub pitch: u32,
    /// The part of the frame to show, in 16.16 fixed point.
    pub source: RectX,
    pub src_w: u16,
    pub src_h: u16,
}

/// Where a frame is drawn.
#[derive(Clone, Copy, Debug)]
pub struct VideoDraw<'a> {
    pub dst_box: RectI,
    pub drw_w: u16,
    pub drw_h: u16,
    /// The visible parts of `dst_box`.
    pub clip_boxes: &'a [RectI],
}

/// Waits for the scanout to leave an area before it is drawn to.
pub trait VBlankSync {
    fn sync_to_vblank(&mut self, pixmap: &Pixmap, area: RectI);
}

/// The render-target format for a pixmap's depth.
pub fn get_surface_format(pixmap: &Pixmap) -> Result<u32, VideoError> {
    match pixmap.bits_per_pixel {
        32 => Ok(regs::RT_FORMAT_COLOR_A8R8G8B8),
        24 => Ok(regs::RT_FORMAT_COLOR_X8R8G8B8),
        16 => Ok(regs::RT_FORMAT_COLOR_R5G6B5),
        8 => Ok(regs::RT_FORMAT_COLOR_B8),
        bpp => Err(VideoError::NoSurfaceFormat(bpp)),
    }
}

pub fn set_port_attribute(port: &mut VideoPort, attribute: PortAttribute, value: i32)
                          -> Result<(), AttributeError> {
    match attribute {
        PortAttribute::SyncToVBlank => {
            if value < 0 || value > 1 {
                return Err(AttributeError::BadValue);
            }
            port.sync_to_vblank = value == 1;
        }
        PortAttribute::SetDefaults => port.sync_to_vblank = true,
        PortAttribute::Other(_) => return Err(AttributeError::BadMatch),
    }
    Ok(())
}

pub fn get_port_attribute(port: &VideoPort, attribute: PortAttribute)
                          -> Result<i32, AttributeError> {
    match attribute {
        PortAttribute::SyncToVBlank => Ok(port.sync_to_vblank as i32),
        PortAttribute::SetDefaults | PortAttribute::Other(_) => Err(AttributeError::BadMatch),
    }
}

/// Whether the bicubic program is used. Downscales and mild upscales fall back to bilinear.
#[inline]
pub fn use_bicubic(port: &VideoPort, frame: &VideoFrame, draw: &VideoDraw) -> bool {
    port.bicubic && !(draw.drw_w / 2 < frame.src_w || draw.drw_h / 2 < frame.src_h)
}

struct VideoTexture<'a> {
    bo: &'a BufferObject,
    offset: u32,
    width: u16,
    height: u16,
    pitch: u16,
}

impl<P, A> Accel<P, A> where P: PushBuffer, A: Allocator {
    /// A new port with the configured defaults.
    pub fn new_video_port(&self) -> VideoPort {
        VideoPort {
            sync_to_vblank: self.options.sync_to_vblank,
            bicubic: self.options.video_bicubic,
        }
    }

    /// Draws `frame` into `pixmap`, scaled to `draw`, once per clip box, and submits the batch.
    pub fn put_image(&mut self,
                     port: &VideoPort,
                     frame: &VideoFrame,
                     draw: &VideoDraw,
                     pixmap: &Pixmap,
                     vblank: Option<&mut dyn VBlankSync>)
                     -> Result<(), VideoError> {
        let result = self.emit_put_image(port, frame, draw, pixmap, vblank);
        match result {
            Err(VideoError::Unsupported) => debug!("textured video unsupported on this chipset"),
            Err(ref err) => warn!("textured video failed: {}", err),
            Ok(()) => {}
        }
        result
    }

    /// Nothing is retained between frames, so there is nothing to stop.
    #[inline]
    pub fn stop_video(&mut self, _: &mut VideoPort) {}

    fn emit_put_image(&mut self,
                      port: &VideoPort,
                      frame: &VideoFrame,
                      draw: &VideoDraw,
                      pixmap: &Pixmap,
                      vblank: Option<&mut dyn VBlankSync>)
                      -> Result<(), VideoError> {
        // NV30 bring-up still uploads its YV12 programs so the shader buffer layout is the same
        // on both generations, but it has no textured-video path to select them.
        if self.generation.family() != Family::Nv40 {
            return Err(VideoError::Unsupported);
        }
        if draw.drw_w as i32 > MAX_TEXTURE_SIZE || draw.drw_h as i32 > MAX_TEXTURE_SIZE {
            return Err(VideoError::DrawTooLarge(draw.drw_w, draw.drw_h));
        }
        let surface_format = get_surface_format(pixmap)?;

        if !self.push.space(PUT_IMAGE_PUSH_SPACE) {
            return Err(VideoError::NoSpace);
        }
        self.push.reset();

        self.generation.emit_blend(&mut self.push, BlendState::Disabled);
        self.push.begin(regs::RT_FORMAT, 3);
        self.push.push(regs::RT_FORMAT_TYPE_LINEAR | regs::RT_FORMAT_ZETA_Z24S8 | surface_format);
        self.push.push(pixmap.pitch);
        self.push.push_reloc(&pixmap.bo, Reloc::low(0, RelocFlags::VRAM | RelocFlags::WR));

        let filter_table = self.filter_table()?;
        let chroma_swizzle = if self.options.big_endian_chroma {
            regs::tex_swizzle([S1; 4], [Z, W, X, Y])
        } else {
            regs::tex_swizzle([S1; 4], [W, Z, Y, X])
        };
        emit_filter_table_texture(&mut self.push, &filter_table);
        emit_plane_texture(&mut self.push,
                           1,
                           &VideoTexture {
                               bo: &frame.bo,
                               offset: frame.luma_offset,
                               width: frame.src_w,
                               height: frame.src_h,
                               pitch: frame.pitch as u16,
                           },
                           regs::NV40_TEX_FORMAT_FORMAT_L8,
                           regs::tex_swizzle([S1; 4], [X, X, X, X]));
        emit_plane_texture(&mut self.push,
                           2,
                           &VideoTexture {
                               bo: &frame.bo,
                               offset: frame.chroma_offset,
                               width: frame.src_w / 2,
                               height: frame.src_h / 2,
                               pitch: frame.pitch as u16,
                           },
                           regs::NV40_TEX_FORMAT_FORMAT_A8L8,
                           chroma_swizzle);

        if let Some(slot) = self.shaders.video_vertex() {
            shaders::load_vertex_program(&mut self.push, slot);
        }
        let program = if use_bicubic(port, frame, draw) {
            VideoProgramId::Yv12Bicubic
        } else {
            VideoProgramId::Yv12Bilinear
        };
        shaders::load_fragment_program(&mut self.push,
                                       &self.shader_buffer,
                                       self.shaders.video(program));
        self.generation.emit_texture_units(&mut self.push, true);

        self.push.bind_bufctx(Some(self.channel.bufctx));
        if self.push.validate().is_err() {
            self.push.bind_bufctx(None);
            return Err(VideoError::Validation);
        }

        if port.sync_to_vblank {
            if let Some(vblank) = vblank {
                vblank.sync_to_vblank(pixmap, draw.dst_box);
            }
        }

        let origin = frame.source.origin_f32();
        let lower_right = frame.source.lower_right_f32();
        let (x1, y1) = (origin.x(), origin.y());
        let (x2, y2) = (lower_right.x(), lower_right.y());
        let (drw_w, drw_h) = (draw.drw_w as f32, draw.drw_h as f32);
        let (src_w, src_h) = (frame.src_w as f32, frame.src_h as f32);
        let (dst_x, dst_y) = (draw.dst_box.min_x(), draw.dst_box.min_y());

        self.push.begin(regs::VERTEX_BEGIN_END, 1);
        self.push.push(regs::VERTEX_BEGIN_END_TRIANGLES);

        for clip in draw.clip_boxes {
            let tx1 = x1 + (clip.min_x() - dst_x) as f32 * (x2 - x1) / drw_w;
            let tx2 = x1 + (clip.max_x() - dst_x) as f32 * src_w / drw_w;
            let ty1 = y1 + (clip.min_y() - dst_y) as f32 * (y2 - y1) / drw_h;
            let ty2 = y1 + (clip.max_y() - dst_y) as f32 * src_h / drw_h;

            if !self.push.space(CLIP_BOX_PUSH_SPACE) {
                self.push.bind_bufctx(None);
                return Err(VideoError::NoSpace);
            }

            self.push.begin(regs::SCISSOR_HORIZ, 2);
            self.push.push((clip.max_x() << 16) as u32);
            self.push.push((clip.max_y() << 16) as u32);

            let (sx1, sy1, sx2, sy2) = (clip.min_x(), clip.min_y(), clip.max_x(), clip.max_y());
            emit_video_vertex(&mut self.push, tx1, ty1, Vector2I::new(sx1, sy1));
            emit_video_vertex(&mut self.push,
                              tx2 + (tx2 - tx1),
                              ty1,
                              Vector2I::new(sx2 + (sx2 - sx1), sy1));
            emit_video_vertex(&mut self.push,
                              tx1,
                              ty2 + (ty2 - ty1),
                              Vector2I::new(sx1, sy2 + (sy2 - sy1)));
        }

        self.push.begin(regs::VERTEX_BEGIN_END, 1);
        self.push.push(regs::VERTEX_BEGIN_END_STOP);
        self.push.bind_bufctx(None);
        self.push.kick();
        Ok(())
    }

    /// The filter table buffer, allocated and filled on first use.
    fn filter_table(&mut self) -> Result<BufferObject, VideoError> {
        let mut table = match self.filter_table {
            Some(table) if table.filled => return Ok(table.bo),
            Some(table) => table,
            None => {
                let flags = BufferFlags::VRAM | BufferFlags::GART | BufferFlags::MAP;
                let bo = self.allocator
                             .allocate(FILTER_TABLE_BUFFER_SIZE, flags)
                             .map_err(VideoError::FilterTable)?;
                FilterTableBuffer { bo, filled: false }
            }
        };
        self.filter_table = Some(table);

        let memory = self.allocator.map(&table.bo).map_err(VideoError::FilterTable)?;
        filter::fill_filter_table(memory);
        table.filled = true;
        self.filter_table = Some(table);
        debug!("filled video filter table");
        Ok(table.bo)
    }
}

fn emit_filter_table_texture(push: &mut dyn PushBuffer, bo: &BufferObject) {
    let reloc = RelocFlags::VRAM | RelocFlags::GART | RelocFlags::RD;
    push.begin(regs::tex_offset(0), 8);
    push.push_reloc(bo, Reloc::low(0, reloc));
    push.push_reloc(bo,
                    Reloc::or(regs::NV40_TEX_FORMAT_FORMAT_A8R8G8B8 |
                              regs::TEX_FORMAT_UNK8000 |
                              regs::TEX_FORMAT_DIMS_1D |
                              regs::TEX_FORMAT_NO_BORDER |
                              (1 << regs::TEX_FORMAT_MIPMAP_COUNT_SHIFT),
                              reloc,
                              regs::TEX_FORMAT_DMA0,
                              regs::TEX_FORMAT_DMA1));
    push.push(regs::tex_wrap(regs::TEX_WRAP_REPEAT,
                             regs::TEX_WRAP_CLAMP_TO_EDGE,
                             regs::TEX_WRAP_CLAMP_TO_EDGE));
    push.push(regs::NV40_TEX_ENABLE_ENABLE);
    push.push(regs::tex_swizzle([S1; 4], [X, Y, Z, W]));
    push.push(regs::TEX_FILTER_SIGNED_ALPHA |
              regs::TEX_FILTER_SIGNED_RED |
              regs::TEX_FILTER_SIGNED_GREEN |
              regs::TEX_FILTER_SIGNED_BLUE |
              regs::tex_filter(regs::TEX_FILTER_LINEAR, regs::TEX_FILTER_LINEAR) |
              regs::NV40_TEX_FILTER_DEFAULT_BITS);
    push.push(((FILTER_TABLE_ENTRIES as u32) << regs::TEX_NPOT_SIZE_W_SHIFT) | 1);
    push.push(0);
    push.begin(regs::nv40_tex_size1(0), 1);
    push.push(1 << regs::NV40_TEX_SIZE1_DEPTH_SHIFT);
}

fn emit_plane_texture(push: &mut dyn PushBuffer,
                      unit: u16,
                      texture: &VideoTexture,
                      format: u32,
                      swizzle: u32) {
    let reloc = RelocFlags::VRAM | RelocFlags::GART | RelocFlags::RD;
    push.begin(regs::tex_offset(unit), 8);
    push.push_reloc(texture.bo, Reloc::low(texture.offset, reloc));
    push.push_reloc(texture.bo,
                    Reloc::or(format |
                              regs::TEX_FORMAT_UNK8000 |
                              regs::NV40_TEX_FORMAT_LINEAR |
                              regs::NV40_TEX_FORMAT_RECT |
                              regs::TEX_FORMAT_DIMS_2D |
                              regs::TEX_FORMAT_NO_BORDER |
                              (1 << regs::TEX_FORMAT_MIPMAP_COUNT_SHIFT),
                              reloc,
                              regs::TEX_FORMAT_DMA0,
                              regs::TEX_FORMAT_DMA1));
    push.push(regs::tex_wrap(regs::TEX_WRAP_CLAMP_TO_EDGE,
                             regs::TEX_WRAP_CLAMP_TO_EDGE,
                             regs::TEX_WRAP_CLAMP_TO_EDGE));
    push.push(regs::NV40_TEX_ENABLE_ENABLE);
    push.push(swizzle);
    push.push(regs::tex_filter(regs::TEX_FILTER_LINEAR, regs::TEX_FILTER_LINEAR) |
              regs::NV40_TEX_FILTER_DEFAULT_BITS);
    push.push(((texture.width as u32) << regs::TEX_NPOT_SIZE_W_SHIFT) | texture.height as u32);
    push.push(0);
    push.begin(regs::nv40_tex_size1(unit), 1);
    push.push((1 << regs::NV40_TEX_SIZE1_DEPTH_SHIFT) | texture.pitch as u32);
}

// Luma coordinates, then chroma at half scale.
fn emit_video_vertex(push: &mut dyn PushBuffer, x: f32, y: f32, position: Vector2I) {
    push.begin(regs::vtx_attr_2f_x(ATTR_TEXCOORD), 4);
    push.push_f32(x);
    push.push_f32(y);
    push.push_f32(x / 2.0);
    push.push_f32(y / 2.0);
    push.begin(regs::vtx_attr_2i(ATTR_POSITION), 1);
    push.push(position.pack_i16());
}

#[cfg(test)]
mod test {
    use super::{get_port_attribute, get_surface_format, set_port_attribute, use_bicubic};
    use super::{PortAttribute, VideoDraw, VideoFrame, VideoPort};
    use crate::error::{AttributeError, VideoError};
    use crate::picture::Pixmap;
    use crate::regs;
    use nvfx_geometry::rect::{RectI, RectX};
    use nvfx_geometry::vector::Vector2I;
    use nvfx_gpu::{BufferFlags, BufferId, BufferObject};

    fn buffer() -> BufferObject {
        BufferObject { id: BufferId(7), size: 0x10000, offset: 0, domain: BufferFlags::VRAM }
    }

    fn pixmap(bits_per_pixel: u32) -> Pixmap {
        Pixmap { size: Vector2I::new(64, 64), pitch: 256, bits_per_pixel, bo: buffer() }
    }

    fn frame(src_w: u16, src_h: u16) -> VideoFrame {
        VideoFrame {
            bo: buffer(),
            luma_offset: 0,
            chroma_offset: 0x4000,
            pitch: 128,
            source: RectX::default(),
            src_w,
            src_h,
        }
    }

    fn draw(drw_w: u16, drw_h: u16) -> VideoDraw<'static> {
        VideoDraw {
            dst_box: RectI::new(Vector2I::zero(), Vector2I::new(drw_w as i32, drw_h as i32)),
            drw_w,
            drw_h,
            clip_boxes: &[],
        }
    }

    #[test]
    fn test_surface_formats() {
        assert_eq!(get_surface_format(&pixmap(32)), Ok(regs::RT_FORMAT_COLOR_A8R8G8B8));
        assert_eq!(get_surface_format(&pixmap(24)), Ok(regs::RT_FORMAT_COLOR_X8R8G8B8));
        assert_eq!(get_surface_format(&pixmap(16)), Ok(regs::RT_FORMAT_COLOR_R5G6B5));
        assert_eq!(get_surface_format(&pixmap(8)), Ok(regs::RT_FORMAT_COLOR_B8));
        assert_eq!(get_surface_format(&pixmap(15)), Err(VideoError::NoSurfaceFormat(15)));
    }

    #[test]
    fn test_sync_to_vblank_attribute() {
        let mut port = VideoPort { sync_to_vblank: true, bicubic: true };
        assert_eq!(set_port_attribute(&mut port, PortAttribute::SyncToVBlank, 0), Ok(()));
        assert_eq!(get_port_attribute(&port, PortAttribute::SyncToVBlank), Ok(0));
        assert_eq!(set_port_attribute(&mut port, PortAttribute::SyncToVBlank, 2),
                   Err(AttributeError::BadValue));
        assert_eq!(set_port_attribute(&mut port, PortAttribute::SyncToVBlank, -1),
                   Err(AttributeError::BadValue));
        assert!(!port.sync_to_vblank);
        assert_eq!(set_port_attribute(&mut port, PortAttribute::SetDefaults, 0), Ok(()));
        assert_eq!(get_port_attribute(&port, PortAttribute::SyncToVBlank), Ok(1));
    }

    #[test]
    fn test_unknown_attributes() {
        let mut port = VideoPort { sync_to_vblank: false, bicubic: true };
        assert_eq!(set_port_attribute(&mut port, PortAttribute::Other(42), 1),
                   Err(AttributeError::BadMatch));
        assert_eq!(get_port_attribute(&port, PortAttribute::Other(42)),
                   Err(AttributeError::BadMatch));
        assert_eq!(get_port_attribute(&port, PortAttribute::SetDefaults),
                   Err(AttributeError::BadMatch));
    }

    #[test]
    fn test_bicubic_threshold() {
        let port = VideoPort { sync_to_vblank: false, bicubic: true };
        assert!(use_bicubic(&port, &frame(320, 240), &draw(640, 480)));
        assert!(use_bicubic(&port, &frame(320, 240), &draw(641, 481)));
        assert!(!use_bicubic(&port, &frame(320, 240), &draw(639, 480)));
        assert!(!use_bicubic(&port, &frame(320, 240), &draw(640, 479)));
        assert!(!use_bicubic(&port, &frame(320, 240), &draw(320, 240)));
        let bilinear = VideoPort { bicubic: false, ..port };
        assert!(!use_bicubic(&bilinear, &frame(320, 240), &draw(1280, 960)));
    }
}
