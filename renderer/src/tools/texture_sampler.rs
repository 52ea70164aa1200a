use wgpu::{AddressMode, Device, FilterMode, Sampler, SamplerDescriptor};

/// Creates an edge clamping texture sampler.
///
/// Sprite sheets are expected to be padded, so that neighbouring sprites don't bleed in.
pub fn clamping(device: &Device, filter: FilterMode) -> Sampler {
    device.create_sampler(&SamplerDescriptor {
        label: Some("Clamping Sprite Sampler"),
        address_mode_u: AddressMode::ClampToEdge,
        address_mode_v: AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    })
}
