//! Background image geometry.
//!
//! The placement of a background image is computed after the positioning
//! pass from the owner's absolute boxes. The result is expressed relative to
//! the owner's border box, which is the area the renderer paints and clips.

use boxkit_css::{
    BackgroundAttachment, BackgroundOrigin, BackgroundPosition, BackgroundRepeat, BackgroundSize,
    ComputedStyle, PositionComponent, SizeComponent,
};
use boxkit_image::DecodedImage;
use tracing::error;
use url::Url;

use crate::context::{CssDecoder, VisualContext};
use crate::tree::{BoxId, BoxKind, BoxTree};
use crate::{Rect, Size};

/// A loaded background image with its style.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    pub url: Url,
    pub image: DecodedImage,
    pub position: BackgroundPosition,
    pub size: BackgroundSize,
    pub repeat: BackgroundRepeat,
    pub origin: BackgroundOrigin,
    pub attachment: BackgroundAttachment,
}

/// Where a background image is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundPlacement {
    /// Image rectangle of the first tile, relative to the owner's border box.
    pub image: Rect,
    /// Absolute border box of the owner; tiles are clipped to it.
    pub clip: Rect,
    pub repeat_x: bool,
    pub repeat_y: bool,
    pub attachment: BackgroundAttachment,
}

impl BackgroundImage {
    pub fn new(url: Url, image: DecodedImage, style: &ComputedStyle) -> Self {
        Self {
            url,
            image,
            position: style.background_position,
            size: style.background_size.clone(),
            repeat: style.background_repeat,
            origin: style.background_origin,
            attachment: style.background_attachment,
        }
    }

    /// Intrinsic size; zero dimensions are treated as 1px.
    pub fn intrinsic_size(&self) -> Size {
        Size::new(self.image.width.max(1.0), self.image.height.max(1.0))
    }

    /// Compute the placement of the image for its owner `id`.
    ///
    /// The viewport positions its background against the padding box of the
    /// root element, or against itself when there is no root element.
    pub fn compute_placement(&self, tree: &BoxTree, id: BoxId) -> BackgroundPlacement {
        let owner = &tree[id];
        let clip = owner.abs_border_box();
        let reference = match owner.kind {
            BoxKind::Viewport => {
                match owner.sub_boxes().iter().copied().find(|&c| tree[c].is_element()) {
                    Some(root) => tree[root].abs_padding_box(),
                    None => clip,
                }
            }
            _ => match self.origin {
                BackgroundOrigin::BorderBox => clip,
                BackgroundOrigin::PaddingBox => owner.abs_padding_box(),
                BackgroundOrigin::ContentBox => owner.abs_content_box(),
            },
        };
        let size = self.compute_size(&owner.ctx, reference.size());
        let dec = CssDecoder::new(&owner.ctx);
        let x = position_offset(&dec, self.position.x, reference.width - size.width);
        let y = position_offset(&dec, self.position.y, reference.height - size.height);
        BackgroundPlacement {
            image: Rect::new(
                reference.x - clip.x + x,
                reference.y - clip.y + y,
                size.width,
                size.height,
            ),
            clip,
            repeat_x: self.repeat.repeats_x(),
            repeat_y: self.repeat.repeats_y(),
            attachment: self.attachment,
        }
    }

    /// Size of the image inside a `container` according to `background-size`.
    pub fn compute_size(&self, ctx: &VisualContext, container: Size) -> Size {
        let intrinsic = self.intrinsic_size();
        let ratio = intrinsic.width / intrinsic.height;
        let by_width = Size::new(container.width, container.width / ratio);
        let by_height = Size::new(container.height * ratio, container.height);
        match &self.size {
            BackgroundSize::Cover => {
                if by_width.height >= container.height {
                    by_width
                } else {
                    by_height
                }
            }
            BackgroundSize::Contain => {
                if by_width.height <= container.height {
                    by_width
                } else {
                    by_height
                }
            }
            BackgroundSize::Values(values) if values.len() == 2 => {
                let dec = CssDecoder::new(ctx);
                match (values[0], values[1]) {
                    (SizeComponent::Auto, SizeComponent::Auto) => intrinsic,
                    (SizeComponent::Length(w), SizeComponent::Auto) => {
                        let w = dec.px(w, container.width);
                        Size::new(w, (w / ratio).round())
                    }
                    (SizeComponent::Auto, SizeComponent::Length(h)) => {
                        let h = dec.px(h, container.height);
                        Size::new((h * ratio).round(), h)
                    }
                    (SizeComponent::Length(w), SizeComponent::Length(h)) => {
                        Size::new(dec.px(w, container.width), dec.px(h, container.height))
                    }
                }
            }
            BackgroundSize::Values(values) => {
                error!(
                    url = %self.url,
                    count = values.len(),
                    "invalid number of background-size values"
                );
                intrinsic
            }
        }
    }
}

/// Offset of the image on one axis; `free` is the container size minus the image size.
fn position_offset(dec: &CssDecoder<'_>, component: PositionComponent, free: f32) -> f32 {
    match component {
        PositionComponent::Start => 0.0,
        PositionComponent::Center => free / 2.0,
        PositionComponent::End => free,
        PositionComponent::Length(len) => dec.px(len, free),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FontSpec, MonospaceMeasurer};
    use boxkit_css::Length;
    use smallvec::smallvec;
    use std::sync::Arc;

    fn ctx() -> VisualContext {
        VisualContext::new(
            Arc::new(MonospaceMeasurer::default()),
            FontSpec::new("serif", 16.0),
            Size::new(800.0, 600.0),
        )
    }

    fn background(w: f32, h: f32, size: BackgroundSize) -> BackgroundImage {
        let style = ComputedStyle {
            background_size: size,
            ..ComputedStyle::new()
        };
        BackgroundImage::new(
            Url::parse("https://example.com/bg.png").expect("valid url"),
            DecodedImage::new(w, h),
            &style,
        )
    }

    #[test]
    fn test_cover_fills_both_axes() {
        let bg = background(50.0, 100.0, BackgroundSize::Cover);
        let size = bg.compute_size(&ctx(), Size::new(200.0, 100.0));
        assert_eq!(size, Size::new(200.0, 400.0));
        let bg = background(100.0, 50.0, BackgroundSize::Cover);
        let size = bg.compute_size(&ctx(), Size::new(100.0, 200.0));
        assert!(size.width >= 100.0 && size.height >= 200.0);
    }

    #[test]
    fn test_contain_fits_inside() {
        let bg = background(50.0, 100.0, BackgroundSize::Contain);
        let size = bg.compute_size(&ctx(), Size::new(200.0, 100.0));
        assert_eq!(size, Size::new(50.0, 100.0));
        let bg = background(100.0, 50.0, BackgroundSize::Contain);
        let size = bg.compute_size(&ctx(), Size::new(100.0, 200.0));
        assert_eq!(size, Size::new(100.0, 50.0));
    }

    #[test]
    fn test_single_length_keeps_ratio() {
        let bg = background(
            40.0,
            30.0,
            BackgroundSize::Values(smallvec![
                SizeComponent::Length(Length::Px(20.0)),
                SizeComponent::Auto
            ]),
        );
        assert_eq!(bg.compute_size(&ctx(), Size::new(200.0, 100.0)), Size::new(20.0, 15.0));
        let bg = background(
            40.0,
            30.0,
            BackgroundSize::Values(smallvec![
                SizeComponent::Auto,
                SizeComponent::Length(Length::Percent(50.0))
            ]),
        );
        assert_eq!(bg.compute_size(&ctx(), Size::new(200.0, 120.0)), Size::new(80.0, 60.0));
    }

    #[test]
    fn test_malformed_size_falls_back_to_intrinsic() {
        let bg = background(40.0, 30.0, BackgroundSize::Values(smallvec![SizeComponent::Auto]));
        assert_eq!(bg.compute_size(&ctx(), Size::new(200.0, 100.0)), Size::new(40.0, 30.0));
    }

    #[test]
    fn test_position_keywords_and_percentages() {
        let dec_ctx = ctx();
        let dec = CssDecoder::new(&dec_ctx);
        assert_eq!(position_offset(&dec, PositionComponent::Center, 150.0), 75.0);
        assert_eq!(position_offset(&dec, PositionComponent::End, 150.0), 150.0);
        let percent = PositionComponent::Length(Length::Percent(20.0));
        assert_eq!(position_offset(&dec, percent, 150.0), 30.0);
        assert_eq!(position_offset(&dec, PositionComponent::Length(Length::Px(7.0)), 150.0), 7.0);
    }
}
