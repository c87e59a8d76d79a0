// nvfx/renderer/src/tests/composite.rs
//
// Copyright © 2020 The nvfx Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::{accel, calls, pixmap, TestAccel, CHANNEL};
use crate::check::check_composite;
use crate::error::{Fallback, PrepareError, Role};
use crate::format::BlendFactor;
use crate::gen;
use crate::picture::{Filter, Op, PictFormat, Picture, Pixmap, RepeatType};
use crate::regs::{self, TEX_SWIZZLE_S0_ONE, TEX_SWIZZLE_S0_S1};
use crate::shaders::FragmentProgramId;
use nvfx_geometry::fixed::Fixed;
use nvfx_geometry::transform::Transform;
use nvfx_geometry::vector::Vector2I;

fn picture(format: PictFormat, pixmap: &Pixmap) -> Picture {
    Picture::new(format, pixmap.size)
}

/// The fragment program the last prepare selected, found through its relocation.
fn active_program(accel: &TestAccel) -> Option<(FragmentProgramId, bool)> {
    let shader_buffer = accel.shader_buffer().id;
    let reloc = accel.push().relocs().iter().rev().find(|reloc| reloc.buffer == shader_buffer)?;
    for &id in &FragmentProgramId::ALL {
        for &a8 in &[false, true] {
            if accel.shaders().fragment(id, a8).offset == reloc.reloc.data {
                return Some((id, a8));
            }
        }
    }
    None
}

#[test]
fn test_add_is_accepted() {
    for &chipset in &[0x30, 0x40] {
        let mut accel = accel(chipset);
        let src = pixmap(&mut accel, 64, 64, 32);
        let dst = pixmap(&mut accel, 256, 256, 32);
        let src = picture(PictFormat::A8R8G8B8, &src);
        let dst = picture(PictFormat::A8R8G8B8, &dst);
        assert_eq!(accel.check_composite(Op::ADD, &src, None, &dst), Ok(()));
    }
}

#[test]
fn test_saturate_is_rejected() {
    let mut accel = accel(0x40);
    let src = pixmap(&mut accel, 8, 8, 32);
    let src = picture(PictFormat::A8R8G8B8, &src);
    assert_eq!(accel.check_composite(Op::SATURATE, &src, None, &src),
               Err(Fallback::UnsupportedOp(Op::SATURATE)));
}

#[test]
fn test_oversized_source_is_rejected() {
    let accel = accel(0x40);
    let src = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(5000, 10));
    let dst = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(64, 64));
    assert_eq!(accel.check_composite(Op::OVER, &src, None, &dst),
               Err(Fallback::TooLarge(Role::Source, 5000, 10)));
}

#[test]
fn test_check_rejection_order() {
    let accel = accel(0x30);
    let dst = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(64, 64));
    let solid = Picture::source_only(PictFormat::A8R8G8B8);
    assert_eq!(accel.check_composite(Op::OVER, &solid, None, &dst),
               Err(Fallback::NoDrawable(Role::Source)));

    let src = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(64, 64));
    let tiled = src.clone().with_repeat(RepeatType::Normal);
    assert_eq!(accel.check_composite(Op::OVER, &tiled, None, &dst),
               Err(Fallback::UnsupportedRepeat(Role::Source, RepeatType::Normal)));
    let pixel = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(1, 1))
        .with_repeat(RepeatType::Normal);
    assert_eq!(accel.check_composite(Op::OVER, &pixel, None, &dst), Ok(()));

    let filtered = src.clone().with_filter(Filter::Good);
    assert_eq!(accel.check_composite(Op::OVER, &filtered, None, &dst),
               Err(Fallback::UnsupportedFilter(Role::Source, Filter::Good)));

    let ca_mask = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(64, 64))
        .with_component_alpha();
    assert_eq!(accel.check_composite(Op::OVER, &src, Some(&ca_mask), &dst),
               Err(Fallback::ComponentAlphaSourceAlpha));
    assert_eq!(accel.check_composite(Op::OUT_REVERSE, &src, Some(&ca_mask), &dst), Ok(()));

    let opaque = Picture::new(PictFormat::X8R8G8B8, Vector2I::new(64, 64))
        .with_transform(Transform::from_scale(Fixed::from_int(2), Fixed::from_int(2)));
    assert_eq!(accel.check_composite(Op::OVER, &opaque, None, &dst),
               Err(Fallback::UntransformableOpaque(Role::Source)));
    let xrgb_dst = Picture::new(PictFormat::X8R8G8B8, Vector2I::new(64, 64));
    assert_eq!(accel.check_composite(Op::OVER, &opaque, None, &xrgb_dst), Ok(()));
}

#[test]
fn test_nv40_repeats_any_size() {
    let accel = accel(0x40);
    let dst = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(64, 64));
    let tiled = Picture::new(PictFormat::A8R8G8B8, Vector2I::new(64, 64))
        .with_repeat(RepeatType::Reflect);
    assert_eq!(accel.check_composite(Op::OVER, &tiled, None, &dst), Ok(()));
}

#[test]
fn test_check_is_pure() {
    fn prop(op: u8, src: usize, dst: usize, width: u16, height: u16, nv40: bool) -> bool {
        let generation = gen::select(if nv40 { 0x40 } else { 0x35 }).unwrap();
        let src_format = PictFormat::ALL[src % PictFormat::ALL.len()];
        let dst_format = PictFormat::ALL[dst % PictFormat::ALL.len()];
        let size = Vector2I::new(width as i32 % 8192 + 1, height as i32 % 8192 + 1);
        let src = Picture::new(src_format, size);
        let dst = Picture::new(dst_format, Vector2I::new(64, 64));

        let first = check_composite(&*generation, Op(op), &src, None, &dst);
        let second = check_composite(&*generation, Op(op), &src, None, &dst);
        if first != second {
            return false;
        }

        // Anything that gets past the operator and destination checks is refused if too big.
        let checkable = op < 13 && generation.tables().surface_format(dst_format).is_some();
        if checkable && (size.x() > 4096 || size.y() > 4096) {
            return first == Err(Fallback::TooLarge(Role::Source, size.x(), size.y()));
        }
        true
    }
    quickcheck::quickcheck(prop as fn(u8, usize, usize, u16, u16, bool) -> bool);
}

#[test]
fn test_format_lookups_are_stable() {
    for &chipset in &[0x30, 0x34, 0x40, 0x4e] {
        let first = gen::select(chipset).unwrap();
        let second = gen::select(chipset).unwrap();
        for &format in &PictFormat::ALL {
            let surface = first.tables().surface_format(format);
            let texture = first.tables().texture_format(format);
            assert_eq!(first.tables().surface_format(format), surface, "{:?}", format);
            assert_eq!(first.tables().texture_format(format), texture, "{:?}", format);
            assert_eq!(second.tables().surface_format(format), surface, "{:?}", format);
            assert_eq!(second.tables().texture_format(format), texture, "{:?}", format);
        }
    }
}

#[test]
fn test_alpha_swizzles_match_formats() {
    for &chipset in &[0x30, 0x40] {
        let generation = gen::select(chipset).unwrap();
        for &format in &PictFormat::ALL {
            let texture = match generation.tables().texture_format(format) {
                Some(texture) => texture,
                None => continue,
            };
            let alpha_source = (texture.swizzle >> 8) & 3;
            if format.has_alpha() {
                assert_eq!(alpha_source, TEX_SWIZZLE_S0_S1, "{:?}", format);
            }
            if alpha_source == TEX_SWIZZLE_S0_ONE {
                assert!(!format.has_alpha(), "{:?}", format);
            }
        }
    }
}

#[test]
fn test_clear_blends_with_zero_factors() {
    for &chipset in &[0x30, 0x40] {
        let mut accel = accel(chipset);
        let src_pixmap = pixmap(&mut accel, 16, 16, 32);
        let dst_pixmap = pixmap(&mut accel, 64, 64, 32);
        let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
        let dst = picture(PictFormat::A8R8G8B8, &dst_pixmap);
        assert_eq!(accel.check_composite(Op::CLEAR, &src, None, &dst), Ok(()));
        accel.prepare_composite(Op::CLEAR, &src, &src_pixmap, None, &dst, &dst_pixmap)
             .unwrap();

        let blend = calls(accel.push(), regs::BLEND_FUNC_ENABLE);
        assert_eq!(blend.len(), 1);
        assert_eq!(blend[0].args[0], 1);
        assert_eq!(blend[0].args[1], BlendFactor::ZERO.packed());
        assert_eq!(blend[0].args[2], BlendFactor::ZERO.packed());
        assert_eq!(blend[0].args.len(), if chipset == 0x30 { 3 } else { 5 });
    }
}

#[test]
fn test_missing_dst_alpha_is_rewritten() {
    let mut accel = accel(0x40);
    let src_pixmap = pixmap(&mut accel, 16, 16, 32);
    let dst_pixmap = pixmap(&mut accel, 64, 64, 32);
    let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
    let dst = picture(PictFormat::X8R8G8B8, &dst_pixmap);

    // In reads destination alpha, which is one here, so it degenerates to Src.
    accel.prepare_composite(Op::IN, &src, &src_pixmap, None, &dst, &dst_pixmap).unwrap();
    assert_eq!(calls(accel.push(), regs::BLEND_FUNC_ENABLE)[0].args, vec![0]);

    accel.push_mut().clear();
    accel.prepare_composite(Op::ATOP, &src, &src_pixmap, None, &dst, &dst_pixmap).unwrap();
    assert_eq!(calls(accel.push(), regs::BLEND_FUNC_ENABLE)[0].args,
               vec![1,
                    BlendFactor::ONE.packed(),
                    BlendFactor::ONE_MINUS_SRC_ALPHA.packed(),
                    0,
                    regs::NV40_BLEND_EQUATION_FUNC_ADD]);
}

#[test]
fn test_nv40_prepare_stream() {
    let mut accel = accel(0x40);
    let src_pixmap = pixmap(&mut accel, 16, 16, 32);
    let dst_pixmap = pixmap(&mut accel, 64, 64, 32);
    let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
    let dst = picture(PictFormat::A8R8G8B8, &dst_pixmap);
    let state = accel.prepare_composite(Op::OVER, &src, &src_pixmap, None, &dst, &dst_pixmap)
                     .unwrap();
    assert!(!state.have_mask);

    let target = calls(accel.push(), regs::RT_FORMAT);
    assert_eq!(target[0].args,
               vec![regs::RT_FORMAT_TYPE_LINEAR |
                    regs::RT_FORMAT_ZETA_Z24S8 |
                    regs::RT_FORMAT_COLOR_A8R8G8B8,
                    dst_pixmap.pitch,
                    dst_pixmap.bo.offset as u32]);
    assert_eq!(calls(accel.push(), regs::VP_START_FROM_ID)[0].args, vec![0]);
    let flushes: Vec<_> = calls(accel.push(), regs::NV40_TEX_CACHE_CTL).into_iter()
                                                                        .map(|call| call.args)
                                                                        .collect();
    assert_eq!(flushes, vec![vec![2], vec![1]]);
    assert_eq!(active_program(&accel), Some((FragmentProgramId::PassTex0, false)));
    assert_eq!(accel.push().bound_bufctx(), Some(CHANNEL.bufctx));
    assert!(accel.push().referenced().contains(&src_pixmap.bo.id));
    assert!(accel.push().referenced().contains(&accel.shader_buffer().id));

    accel.done_composite(state);
    assert_eq!(accel.push().bound_bufctx(), None);
}

#[test]
fn test_fragment_program_selection() {
    let mut accel = accel(0x30);
    let src_pixmap = pixmap(&mut accel, 16, 16, 32);
    let mask_pixmap = pixmap(&mut accel, 16, 16, 32);
    let dst_pixmap = pixmap(&mut accel, 64, 64, 32);
    let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
    let mask = picture(PictFormat::A8R8G8B8, &mask_pixmap);
    let ca_mask = mask.clone().with_component_alpha();
    let dst = picture(PictFormat::A8R8G8B8, &dst_pixmap);
    let a8_dst = picture(PictFormat::A8, &dst_pixmap);

    let cases = [
        (Op::OVER, Some(&mask), &dst, FragmentProgramId::CompositeMask, false),
        (Op::ADD, Some(&ca_mask), &dst, FragmentProgramId::CompositeMaskCa, false),
        (Op::OUT_REVERSE, Some(&ca_mask), &dst, FragmentProgramId::CompositeMaskSaCa, false),
        (Op::OVER, None, &a8_dst, FragmentProgramId::PassTex0, true),
    ];
    for &(op, mask, dst, program, a8) in &cases {
        accel.push_mut().clear();
        let state = accel.prepare_composite(op,
                                            &src,
                                            &src_pixmap,
                                            mask.map(|mask| (mask, &mask_pixmap)),
                                            dst,
                                            &dst_pixmap)
                         .unwrap();
        assert_eq!(state.have_mask, mask.is_some());
        assert_eq!(active_program(&accel), Some((program, a8)), "{:?}", op);
        let units = calls(accel.push(), regs::TEX_UNITS_ENABLE);
        assert_eq!(units[0].args, vec![if mask.is_some() { 3 } else { 1 }]);
        accel.done_composite(state);
    }
}

#[test]
fn test_prepare_failures() {
    let mut accel = accel(0x40);
    let src_pixmap = pixmap(&mut accel, 16, 16, 32);
    let dst_pixmap = pixmap(&mut accel, 64, 64, 32);
    let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
    let dst = picture(PictFormat::A8R8G8B8, &dst_pixmap);

    accel.push_mut().set_fail_validation(true);
    assert_eq!(accel.prepare_composite(Op::OVER, &src, &src_pixmap, None, &dst, &dst_pixmap),
               Err(PrepareError::Validation));
    assert_eq!(accel.push().bound_bufctx(), None);
    accel.push_mut().set_fail_validation(false);

    let used = accel.push().words().len();
    accel.push_mut().set_capacity_limit(Some(used + 16));
    assert_eq!(accel.prepare_composite(Op::OVER, &src, &src_pixmap, None, &dst, &dst_pixmap),
               Err(PrepareError::NoSpace));
    assert_eq!(accel.push().words().len(), used);
    accel.push_mut().set_capacity_limit(None);

    let abgr = picture(PictFormat::A8B8G8R8, &dst_pixmap);
    assert_eq!(accel.prepare_composite(Op::OVER, &src, &src_pixmap, None, &abgr, &dst_pixmap),
               Err(PrepareError::DestinationFormat(PictFormat::A8B8G8R8)));
    assert_eq!(accel.prepare_composite(Op::SATURATE, &src, &src_pixmap, None, &dst, &dst_pixmap),
               Err(PrepareError::UnsupportedOp(Op::SATURATE)));
}

#[test]
fn test_nv30_rectangle_geometry() {
    let mut accel = accel(0x30);
    let src_pixmap = pixmap(&mut accel, 128, 128, 32);
    let dst_pixmap = pixmap(&mut accel, 256, 256, 32);
    let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
    let dst = picture(PictFormat::A8R8G8B8, &dst_pixmap);
    let state = accel.prepare_composite(Op::OVER, &src, &src_pixmap, None, &dst, &dst_pixmap)
                     .unwrap();
    accel.push_mut().clear();

    accel.composite(&state,
                    Vector2I::new(10, 10),
                    Vector2I::new(0, 0),
                    Vector2I::new(50, 50),
                    Vector2I::new(20, 30));

    let commands = accel.push().commands();
    assert_eq!(commands[0].method, regs::SCISSOR_HORIZ.offset);
    assert_eq!(commands[0].args, vec![(20 << 16) | 50, (30 << 16) | 50]);
    assert_eq!(commands[1].method, regs::VERTEX_BEGIN_END.offset);
    assert_eq!(commands[1].args, vec![regs::VERTEX_BEGIN_END_TRIANGLES]);

    let texcoords = calls(accel.push(), regs::vtx_attr_2f_x(8));
    let positions = calls(accel.push(), regs::vtx_attr_2i(0));
    assert_eq!(texcoords.len(), 3);
    let expected = [((10.0, -20.0), (50, 20)), ((10.0, 40.0), (50, 80)), ((50.0, 40.0), (90, 80))];
    for (index, &((s, t), (x, y))) in expected.iter().enumerate() {
        assert_eq!(texcoords[index].args.len(), 2);
        assert_eq!(texcoords[index].arg_f32(0), s);
        assert_eq!(texcoords[index].arg_f32(1), t);
        assert_eq!(positions[index].args, vec![Vector2I::new(x, y).pack_i16()]);
    }

    let last = commands.last().unwrap();
    assert_eq!(last.method, regs::VERTEX_BEGIN_END.offset);
    assert_eq!(last.args, vec![regs::VERTEX_BEGIN_END_STOP]);
}

#[test]
fn test_nv40_normalized_mask_geometry() {
    let mut accel = accel(0x40);
    let src_pixmap = pixmap(&mut accel, 100, 50, 32);
    let mask_pixmap = pixmap(&mut accel, 10, 10, 8);
    let dst_pixmap = pixmap(&mut accel, 256, 256, 32);
    let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
    let mask = picture(PictFormat::A8, &mask_pixmap);
    let dst = picture(PictFormat::A8R8G8B8, &dst_pixmap);
    let state = accel.prepare_composite(Op::OVER,
                                        &src,
                                        &src_pixmap,
                                        Some((&mask, &mask_pixmap)),
                                        &dst,
                                        &dst_pixmap)
                     .unwrap();
    assert!(state.have_mask);
    accel.push_mut().clear();

    accel.composite(&state,
                    Vector2I::new(10, 10),
                    Vector2I::new(2, 3),
                    Vector2I::new(0, 0),
                    Vector2I::new(4, 5));

    let texcoords = calls(accel.push(), regs::vtx_attr_2f_x(8));
    assert_eq!(texcoords.len(), 3);
    assert!(texcoords.iter().all(|call| call.args.len() == 4));
    assert_eq!(texcoords[0].arg_f32(0), 10.0 / 100.0);
    assert_eq!(texcoords[0].arg_f32(1), 5.0 / 50.0);
    assert_eq!(texcoords[0].arg_f32(2), 2.0 / 10.0);
    assert_eq!(texcoords[0].arg_f32(3), -2.0 / 10.0);
    assert_eq!(texcoords[2].arg_f32(0), 18.0 / 100.0);
    assert_eq!(texcoords[2].arg_f32(3), 8.0 / 10.0);

    let positions = calls(accel.push(), regs::vtx_attr_2i(0));
    assert_eq!(positions[0].args, vec![Vector2I::new(0, -5).pack_i16()]);
    assert_eq!(positions[2].args, vec![Vector2I::new(8, 5).pack_i16()]);
}

#[test]
fn test_composite_without_space_is_dropped() {
    let mut accel = accel(0x40);
    let src_pixmap = pixmap(&mut accel, 16, 16, 32);
    let dst_pixmap = pixmap(&mut accel, 64, 64, 32);
    let src = picture(PictFormat::A8R8G8B8, &src_pixmap);
    let dst = picture(PictFormat::A8R8G8B8, &dst_pixmap);
    let state = accel.prepare_composite(Op::OVER, &src, &src_pixmap, None, &dst, &dst_pixmap)
                     .unwrap();

    let used = accel.push().words().len();
    accel.push_mut().set_capacity_limit(Some(used + 63));
    accel.composite(&state, Vector2I::zero(), Vector2I::zero(), Vector2I::zero(),
                    Vector2I::new(8, 8));
    assert_eq!(accel.push().words().len(), used);
}
