use ort::execution_providers::ExecutionProviderDispatch;

/// Hardware accelerators to try for face inference on this platform.
///
/// An empty list means plain CPU. ONNX Runtime falls back to CPU on its own
/// when a listed provider fails to register.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_list_matches_platform() {
        let providers = preferred_execution_providers();
        if cfg!(any(target_os = "macos", target_os = "windows")) {
            assert_eq!(providers.len(), 1);
        } else {
            assert!(providers.is_empty());
        }
    }
}
