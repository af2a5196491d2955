pub struct Utils;

impl Utils {
    /// Extract the port number from a local address column.
    ///
    /// Handles multiple address formats:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000", ":::8080" or "\[::]"
    ///
    /// Returns 0 when no port in 1-65535 can be read, which callers treat
    /// as "no listener on this row".
    pub fn parse_port(address: &str) -> u16 {
        let address = address.trim();
        let address = address.strip_prefix('[').unwrap_or(address);
        let address = address.strip_suffix(']').unwrap_or(address);

        let port_str = match address.rfind(':') {
            Some(idx) => &address[idx + 1..],
            None => address,
        };

        port_str.trim().parse::<u16>().unwrap_or(0)
    }

    /// Split one line of quoted CSV such as `"node.exe","4242","Console"`.
    pub fn split_csv_line(line: &str) -> Vec<String> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        let line = line.strip_prefix('"').unwrap_or(line);
        let line = line.strip_suffix('"').unwrap_or(line);
        line.split("\",\"").map(str::to_string).collect()
    }
}
