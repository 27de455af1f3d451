fn main() -> anyhow::Result<()> {
    weather_node::node()
}
