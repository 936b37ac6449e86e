/// Lifecycle callbacks for a stateful node.
///
/// Created once per scope handle and delivered on the presentation thread.
/// A parent's mount notifications surround those of its children.
pub trait Controller: Send + Sync {
    fn will_mount(&self) {}
    fn did_mount(&self) {}
    /// The node is about to be re-mounted with a new producer.
    fn will_update(&self) {}
    fn did_update(&self) {}
    fn will_unmount(&self) {}
    fn did_unmount(&self) {}
    /// The node's scope handle failed to match in a committed generation.
    fn did_teardown(&self) {}
}
