// SPDX-License-Identifier: Apache-2.0 OR MIT
fn main() {
    // Timing-sensitive concurrency tests opt out of coverage runs with
    // #[cfg(not(tarpaulin))]; cargo tarpaulin sets the flag, and this
    // declaration keeps ordinary builds from warning about an unknown cfg.
    println!("cargo:rustc-check-cfg=cfg(tarpaulin)");
}
