// renderer/error.rs

#[derive(Debug)]
pub enum RenderError {
    /// The device could not allocate a buffer or program resource.
    ResourceExhaustion {
        label: &'static str,
        message: String,
    },
    /// More instance transforms were pushed than the instance buffer holds.
    CapacityExceeded { requested: usize, capacity: usize },
    CreateSurface(wgpu::CreateSurfaceError),
    Adapter(wgpu::RequestAdapterError),
    Device(wgpu::RequestDeviceError),
    Surface(wgpu::SurfaceError),
}

impl From<wgpu::CreateSurfaceError> for RenderError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        RenderError::CreateSurface(e)
    }
}

impl From<wgpu::RequestAdapterError> for RenderError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        RenderError::Adapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderError::Device(e)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        RenderError::Surface(e)
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::ResourceExhaustion { label, message } => {
                write!(f, "Failed to allocate {}: {}", label, message)
            }
            RenderError::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "Too many instance transforms: {} requested, capacity is {}",
                requested, capacity
            ),
            RenderError::CreateSurface(e) => write!(f, "Surface creation error: {}", e),
            RenderError::Adapter(e) => write!(f, "Adapter error: {}", e),
            RenderError::Device(e) => write!(f, "Device error: {}", e),
            RenderError::Surface(e) => write!(f, "Surface error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {}

/// Runs `create` inside out-of-memory and validation error scopes and turns
/// a captured device error into [`RenderError::ResourceExhaustion`].
///
/// Requests beyond the device limits surface as validation errors, so both
/// filters are needed to keep them away from the uncaptured-error handler.
pub(crate) fn allocate<T>(
    device: &wgpu::Device,
    label: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let resource = create();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match validation.or(out_of_memory) {
        Some(err) => {
            log::error!("Allocation of {} failed: {}", label, err);
            Err(RenderError::ResourceExhaustion {
                label,
                message: err.to_string(),
            })
        }
        None => Ok(resource),
    }
}

/// Byte size of `count` elements of `stride` bytes, or an exhaustion error
/// when that does not fit a buffer address.
pub(crate) fn buffer_size(
    label: &'static str,
    count: usize,
    stride: wgpu::BufferAddress,
) -> Result<wgpu::BufferAddress, RenderError> {
    wgpu::BufferAddress::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(stride))
        .ok_or_else(|| {
            log::error!("Size of {} overflows: {} x {} bytes", label, count, stride);
            RenderError::ResourceExhaustion {
                label,
                message: format!("{} elements of {} bytes overflow", count, stride),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_both_counts() {
        let err = RenderError::CapacityExceeded {
            requested: 1001,
            capacity: 1000,
        };
        let text = err.to_string();
        assert!(text.contains("1001"));
        assert!(text.contains("1000"));
    }

    #[test]
    fn buffer_size_multiplies_stride() {
        assert_eq!(buffer_size("test", 1000, 64).unwrap(), 64_000);
        assert_eq!(buffer_size("test", 0, 64).unwrap(), 0);
    }

    #[test]
    fn buffer_size_rejects_overflow() {
        let err = buffer_size("test", usize::MAX, 64).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ResourceExhaustion { label: "test", .. }
        ));
    }
}
