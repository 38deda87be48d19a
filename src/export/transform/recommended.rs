//! Recommended prevention settings per platform

const WINDOWS: &[(&str, &str)] = &[
    ("Notify End Users", "ON"),
    ("Unknown Detection-Related Executables", "ON"),
    ("Unknown Executables", "ON"),
    ("Sensor Tampering Protection", "ON"),
    ("Additional User Mode Data", "ON"),
    ("Interpreter-Only", "ON"),
    ("Engine (Full Visibility)", "ON"),
    ("Script-Based Execution Monitoring", "ON"),
    ("HTTP Detections", "ON"),
    ("Redact HTTP Detection Details", "ON"),
    ("Hardware-Enhanced Exploit Detection", "ON"),
    ("Enhanced Exploitation Visibility", "ON"),
    ("Extended User Mode Data (Detection)", "MODERATE"),
    ("Enhanced DLL Load Visibility", "OFF"),
    ("WSL2 Visibility", "OFF"),
    ("Memory Scanning", "ON"),
    ("Scan with CPU", "ON"),
    ("BIOS Deep Visibility", "ON"),
    ("Cloud Anti-malware (Detection)", "AGGRESSIVE"),
    ("Cloud Anti-malware (Prevention)", "AGGRESSIVE"),
    ("Adware & PUP (Detection)", "AGGRESSIVE"),
    ("Adware & PUP (Prevention)", "AGGRESSIVE"),
    ("Sensor Anti-malware (Detection)", "AGGRESSIVE"),
    ("Sensor Anti-malware (Prevention)", "AGGRESSIVE"),
    ("Enhanced ML for larger files", "ON"),
    ("Sensor Anti-malware for End-User Initiated Scans (Detection)", "AGGRESSIVE"),
    ("Sensor Anti-malware for End-User Initiated Scans (Prevention)", "AGGRESSIVE"),
    ("Cloud Anti-malware for End-User Initiated Scans (Detection)", "AGGRESSIVE"),
    ("Cloud Anti-malware for End-User Initiated Scans (Prevention)", "AGGRESSIVE"),
    ("Cloud PUP/Adware for End-User Initiated Scans (Detection)", "DISABLED"),
    ("Cloud PUP/Adware for End-User Initiated Scans (Prevention)", "DISABLED"),
    ("USB Insertion Triggered Scan", "ON"),
    ("Detect on Write", "ON"),
    ("Quarantine on Write", "ON"),
    ("On Write Script File Visibility", "ON"),
    ("Quarantine & Security Center Registration", "ON"),
    ("Quarantine on Removable Media", "ON"),
    ("Cloud Anti-malware For Microsoft Office Files (Detection)", "AGGRESSIVE"),
    ("Cloud Anti-malware For Microsoft Office Files (Prevention)", "AGGRESSIVE"),
    ("Microsoft Office File Malicious Macro Removal", "ON"),
    ("Custom Blocking", "ON"),
    ("Suspicious Processes", "ON"),
    ("Suspicious Registry Operations", "ON"),
    ("Boot Configuration Database Protection", "OFF"),
    ("File System Containment", "OFF"),
    ("Suspicious Scripts and Commands", "ON"),
    ("Intelligence-Sourced Threats", "ON"),
    ("Driver Load Prevention", "ON"),
    ("Vulnerable Driver Protection", "ON"),
    ("Force ASLR", "ON"),
    ("Force DEP", "OFF"),
    ("Heap Spray Preallocation", "ON"),
    ("NULL Page Allocation", "ON"),
    ("SEH Overwrite Protection", "ON"),
    ("Backup Deletion", "ON"),
    ("Cryptowall", "ON"),
    ("File Encryption", "ON"),
    ("Locky", "ON"),
    ("File System Access", "ON"),
    ("Volume Shadow Copy - Audit", "ON"),
    ("Volume Shadow Copy - Protect", "ON"),
    ("Application Exploitation Activity", "ON"),
    ("Chopper Webshell", "ON"),
    ("Drive-by Download", "ON"),
    ("Code Injection", "ON"),
    ("JavaScript Execution Via Rundll32", "ON"),
    ("Windows Logon Bypass (\"Sticky Keys\")", "ON"),
    ("Credential Dumping", "ON"),
    ("Advanced Remediation", "ON"),
];

const LINUX: &[(&str, &str)] = &[
    ("Unknown Detection-Related Executables", "ON"),
    ("Unknown Executables", "ON"),
    ("Sensor Tampering Protection", "ON"),
    ("Script-Based Execution Monitoring", "ON"),
    ("Filesystem Visibility", "ON"),
    ("Network Visibility", "ON"),
    ("Http Visibility", "ON"),
    ("FTP Visibility", "ON"),
    ("TLS Visibility", "ON"),
    ("Extended Command Line Visibility", "ON"),
    ("Email Protocol Visibility", "ON"),
    ("Memory Visibility", "ON"),
    ("D-Bus Visibility", "ON"),
    ("Enhance PHP Visibility", "ON"),
    ("Cloud Anti-malware (Detection)", "AGGRESSIVE"),
    ("Cloud Anti-malware (Prevention)", "AGGRESSIVE"),
    ("Sensor Anti-malware (Detection)", "AGGRESSIVE"),
    ("Sensor Anti-malware (Prevention)", "AGGRESSIVE"),
    ("Quarantine", "ON"),
    ("On Write Script File Visibility", "ON"),
    ("Custom Blocking", "ON"),
    ("Suspicious Processes", "ON"),
    ("Drift Prevention", "ON"),
];

const MAC: &[(&str, &str)] = &[
    ("Notify End Users", "ON"),
    ("Unknown Detection-Related Executables", "ON"),
    ("Sensor Tampering Protection", "ON"),
    ("Unknown Executables", "ON"),
    ("Script-Based Execution Monitoring", "ON"),
    ("Cloud Anti-malware (Detection)", "AGGRESSIVE"),
    ("Cloud Anti-malware (Prevention)", "AGGRESSIVE"),
    ("Adware & PUP (Detection)", "AGGRESSIVE"),
    ("Adware & PUP (Prevention)", "AGGRESSIVE"),
    ("Sensor Anti-malware (Detection)", "AGGRESSIVE"),
    ("Sensor Anti-malware (Prevention)", "AGGRESSIVE"),
    ("Quarantine", "ON"),
    ("Detect on Write", "ON"),
    ("Quarantine on Write", "ON"),
    ("Custom Blocking", "ON"),
    ("Suspicious Processes", "ON"),
    ("Intelligence-Sourced Threats", "ON"),
    ("XPCOM Shell", "ON"),
    ("Chopper Webshell", "ON"),
    ("Empyre Backdoor", "ON"),
    ("KcPassword Decoded", "ON"),
    ("Hash Collector", "ON"),
];

/// Recommended value for a (normalized) setting row on `platform`.
pub fn lookup(platform: &str, setting: &str) -> Option<&'static str> {
    let table = match platform {
        "Windows" => WINDOWS,
        "Linux" => LINUX,
        "Mac" => MAC,
        _ => return None,
    };
    table
        .iter()
        .find(|(name, _)| *name == setting)
        .map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_platform() {
        assert_eq!(lookup("Windows", "Force DEP"), Some("OFF"));
        assert_eq!(lookup("Linux", "Drift Prevention"), Some("ON"));
        assert_eq!(lookup("Mac", "Cloud Anti-malware (Prevention)"), Some("AGGRESSIVE"));
    }

    #[test]
    fn test_lookup_misses() {
        assert_eq!(lookup("Mac", "Force DEP"), None);
        assert_eq!(lookup("Unknown", "Quarantine"), None);
        assert_eq!(lookup("Windows", "Host Count"), None);
    }
}
