use crate::rendering::passes::render_pass_context::{PassCreationContext, RenderPassContext};

pub(crate) trait Pass {
    type TextureViews;
    type Draw<'a>;

    fn create(context: &mut PassCreationContext) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn render(
        &self,
        context: &mut RenderPassContext,
        texture_views: &Self::TextureViews,
        draws: &[Self::Draw<'_>],
    );
}
