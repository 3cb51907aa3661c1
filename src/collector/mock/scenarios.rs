//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various system conditions.

use super::filesystem::MockFs;

/// `/proc/stat` sample used as the first reading in the typical scenario.
pub const STAT_SAMPLE_1: &str = "\
cpu  1000 200 300 4000 500 600 700 800
cpu0 250 50 75 1000 125 150 175 200
cpu1 250 50 75 1000 125 150 175 200
cpu2 250 50 75 1000 125 150 175 200
cpu3 250 50 75 1000 125 150 175 200
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
";

/// `/proc/stat` sample taken after [`STAT_SAMPLE_1`]: 1600 ticks elapsed, 500 idle.
pub const STAT_SAMPLE_2: &str = "\
cpu  1500 300 400 4500 600 700 800 900
cpu0 375 75 100 1125 150 175 200 225
cpu1 375 75 100 1125 150 175 200 225
cpu2 375 75 100 1125 150 175 200 225
cpu3 375 75 100 1125 150 175 200 225
intr 1000100 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500100
btime 1700000000
processes 10010
procs_running 3
procs_blocked 0
";

impl MockFs {
    /// Creates a typical, lightly loaded 4-CPU system with 16 GB of RAM.
    pub fn typical_system() -> Self {
        let fs = Self::new();

        fs.add_file("/proc/stat", STAT_SAMPLE_1);
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         4096000 kB
MemAvailable:    6553600 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );
        fs.add_file("/proc/loadavg", "1.25 0.75 0.50 2/123 12345\n");

        fs
    }

    /// Creates a system under heavy CPU load with little memory left.
    pub fn busy_system() -> Self {
        let fs = Self::new();

        fs.add_file(
            "/proc/stat",
            "\
cpu  90000 1000 8000 1000 0 0 0 0
cpu0 45000 500 4000 500 0 0 0 0
cpu1 45000 500 4000 500 0 0 0 0
",
        );
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:        8192000 kB
MemFree:          102400 kB
MemAvailable:     409600 kB
",
        );
        fs.add_file("/proc/loadavg", "4.50 3.20 2.10 8/300 99999\n");

        fs
    }

    /// Creates a system whose files exist but do not follow the `/proc` format.
    pub fn degraded_system() -> Self {
        let fs = Self::new();

        fs.add_file("/proc/stat", "intr 1000000\nctxt 500000\n");
        fs.add_file("/proc/meminfo", "Shmem: 1024 kB\n");
        fs.add_file("/proc/loadavg", "invalid");

        fs
    }

    /// Creates a typical system where `/proc/meminfo` cannot be read.
    pub fn missing_meminfo() -> Self {
        let fs = Self::typical_system();
        fs.remove_file("/proc/meminfo");
        fs
    }
}
