fn main() -> Result<(), winit::error::EventLoopError> {
    lantern::run()
}
