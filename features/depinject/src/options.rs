/// Configuration of a [crate::Container], fixed at construction
///
/// Every inference is disabled by default.
///
/// ```
/// use depinject::ContainerOptions;
///
/// let options = ContainerOptions::new()
///     .with_interface_inference()
///     .with_list_inference();
/// assert!(options.infer_lists);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Values may be injected as the capabilities declared with [crate::Container::implements]
    pub infer_interfaces: bool,
    /// A type may have many producers, which are collected by list dependencies
    pub infer_lists: bool,
    /// Input groups are assembled from their members by the container
    pub use_in_sentinel: bool,
    /// Output groups are split into their members by the container
    pub use_out_sentinel: bool,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface_inference(mut self) -> Self {
        self.infer_interfaces = true;
        self
    }

    pub fn with_list_inference(mut self) -> Self {
        self.infer_lists = true;
        self
    }

    pub fn with_in_sentinel(mut self) -> Self {
        self.use_in_sentinel = true;
        self
    }

    pub fn with_out_sentinel(mut self) -> Self {
        self.use_out_sentinel = true;
        self
    }

    /// Every inference enabled
    pub fn all() -> Self {
        Self::new()
            .with_interface_inference()
            .with_list_inference()
            .with_in_sentinel()
            .with_out_sentinel()
    }
}
