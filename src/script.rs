//! Scripted journey content
//!
//! The copy and mock payloads each stage emits. Nothing here is computed;
//! the analysis backend may replace the trend list, everything else is fixed.

use crate::conversation::embed::{
    rank_trends, BuildLog, BuildProgress, Idea, LogLevel, ProposalSection, StepStatus, TestReport,
    TestStep, Trend,
};

pub const ANALYSIS_STARTED: &str = "🔍 Starting trend analysis...";
pub const TRENDS_SUMMARY: &str = "I analyzed 200+ data points across Product Hunt, GitHub, Reddit, and Hacker News. Here are the top 5 opportunities:";
pub const IDEAS_INTRO: &str = "Great choice! I generated 5 startup ideas based on this trend:";
pub const PROPOSAL_INTRO: &str =
    "Excellent! I created a comprehensive 10-section proposal for your startup:";
pub const BUILD_REQUEST: &str = "Build the MVP";
pub const BUILD_STARTED: &str = "Building your MVP now...";
pub const TEST_REQUEST: &str = "Run automated tests";
pub const TESTS_PASSED: &str = "All tests passed! Here is your test report:";
pub const BACKEND_APOLOGY: &str =
    "Sorry, I encountered an error. Make sure the analysis backend is running.";

/// One progress line shown while the trend scan runs
#[derive(Debug, Clone, Copy)]
pub struct StatusLine {
    pub icon: &'static str,
    pub text: &'static str,
    /// Pause before the line is shown
    pub delay_ms: u64,
}

impl StatusLine {
    pub fn render(&self) -> String {
        format!("{} {}", self.icon, self.text)
    }
}

pub const STATUS_LINES: &[StatusLine] = &[
    StatusLine { icon: "🔍", text: "Scraping Product Hunt...", delay_ms: 0 },
    StatusLine { icon: "✅", text: "Found 47 posts (342 upvotes)", delay_ms: 1200 },
    StatusLine { icon: "🔍", text: "Scraping GitHub trending...", delay_ms: 1400 },
    StatusLine { icon: "✅", text: "Found 23 repos (4.2K stars)", delay_ms: 2600 },
    StatusLine { icon: "🔍", text: "Scraping Reddit r/nursing...", delay_ms: 2800 },
    StatusLine { icon: "✅", text: "Found 67 discussions (892 comments)", delay_ms: 4000 },
    StatusLine { icon: "🔍", text: "Scraping Hacker News...", delay_ms: 4200 },
    StatusLine { icon: "✅", text: "Found 12 relevant threads (234 points)", delay_ms: 5400 },
    StatusLine { icon: "🧠", text: "Clustering by keywords...", delay_ms: 5600 },
    StatusLine { icon: "✅", text: "Identified 5 trend clusters", delay_ms: 6800 },
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn trend(
    id: u32,
    title: &str,
    score: f64,
    (momentum, pain, competition, build): (u8, u8, u8, u8),
    pain_points: &[&str],
    evidence: &[&str],
) -> Trend {
    Trend {
        id,
        title: title.to_string(),
        score,
        momentum,
        pain,
        competition,
        build,
        pain_points: strings(pain_points),
        evidence: strings(evidence),
    }
}

/// The five ranked trend clusters
pub fn trends() -> Vec<Trend> {
    rank_trends(vec![
        trend(
            1,
            "AI Meeting Notes for Nurses",
            8.7,
            (9, 9, 3, 5),
            &[
                "We waste 2 hours/day on notes",
                "Existing tools don't understand medical terms",
                "Manual SOAP formatting is tedious",
            ],
            &[
                "Product Hunt: 342 upvotes (↑ 312%)",
                "Reddit r/nursing: 47 comments, 89% positive",
                "GitHub trending: Similar repos gained 2.3K stars this month",
            ],
        ),
        trend(
            2,
            "AI Expense Tracking for Freelancers",
            7.4,
            (7, 8, 6, 4),
            &[
                "Manual categorization takes hours each month",
                "Miss tax deductions due to poor tracking",
                "Receipt management is a nightmare",
            ],
            &[
                "Product Hunt: 218 upvotes",
                "Hacker News: 34 comments, front page for 8 hours",
                "Reddit r/freelance: 'I'd pay $50/month for this'",
            ],
        ),
        trend(
            3,
            "AI Code Review for Solo Developers",
            6.8,
            (8, 7, 7, 6),
            &[
                "No senior dev to review code",
                "Security vulnerabilities slip through",
                "Hard to maintain consistency alone",
            ],
            &[
                "GitHub trending: 5 similar projects launched this quarter",
                "Dev.to: 156 upvotes on 'I need AI code review'",
                "Product Hunt: 3 competing tools, all 500+ upvotes",
            ],
        ),
        trend(
            4,
            "Voice-to-CRM for Sales Teams",
            6.2,
            (6, 8, 5, 7),
            &[
                "Salespeople hate manual CRM data entry",
                "Call notes get lost or forgotten",
                "Poor data quality hurts forecasting",
            ],
            &[
                "Product Hunt: 189 upvotes",
                "LinkedIn Sales groups: 'This would save 5 hours/week'",
                "G2 reviews: Existing CRMs have 2.3★ on 'ease of data entry'",
            ],
        ),
        trend(
            5,
            "AI Contract Review for Startups",
            5.9,
            (5, 7, 8, 8),
            &[
                "Legal review costs $500-2000 per contract",
                "Turnaround time is 3-5 days",
                "Can't afford full-time legal counsel",
            ],
            &[
                "Product Hunt: 167 upvotes",
                "Reddit r/startups: 'We need this yesterday'",
                "YC companies: 12% mention contract review pain in batches",
            ],
        ),
    ])
}

fn idea(
    id: u32,
    title: &str,
    concept: &str,
    target_user: &str,
    advantages: &[&str],
    memory_reasoning: &str,
    recommended: bool,
) -> Idea {
    Idea {
        id,
        title: title.to_string(),
        concept: concept.to_string(),
        target_user: target_user.to_string(),
        advantages: strings(advantages),
        memory_reasoning: memory_reasoning.to_string(),
        recommended,
    }
}

/// Startup ideas offered after a trend is chosen
pub fn ideas() -> Vec<Idea> {
    vec![
        idea(
            1,
            "NurseNote AI — Voice-to-Chart for Healthcare",
            "Voice-activated notes that auto-transcribe to SOAP format, integrate with EMR systems, and suggest ICD-10 codes.",
            "Registered nurses (12-hour shifts), spending 2+ hours/day on documentation",
            &[
                "Medical terminology model (trained on 500K+ clinical notes)",
                "HIPAA-compliant infrastructure from day 1",
                "EMR partnerships (Epic, Cerner integration roadmap)",
                "Offline mode for low-connectivity hospital areas",
            ],
            "Prioritizing B2B because you rejected B2C ideas last time for high CAC. Healthcare has strong unit economics ($100-200 per user/month is normal). Hospitals have budget.",
            true,
        ),
        idea(
            2,
            "ExpenseIQ — AI-Powered Expense Categorization",
            "Snap receipts, auto-categorize for taxes, integrates with accounting software (QuickBooks, Xero).",
            "Freelancers and solopreneurs earning $50K-200K/year, filing quarterly taxes",
            &[
                "Receipt OCR with 98% accuracy",
                "Tax optimization suggestions (saves users $2-5K/year)",
                "Accountant collaboration features",
                "Multi-currency support for global freelancers",
            ],
            "This is B2B (freelancers run businesses) but has some B2C vibes. CAC is manageable at $30-50 via content marketing. LTV is strong ($600-1200/year).",
            false,
        ),
        idea(
            3,
            "CodeSensei — AI Senior Developer for Solo Founders",
            "AI code review, architecture suggestions, security audits for solo developers building MVPs.",
            "Solo founders, indie hackers, junior devs working alone",
            &[
                "Learns your codebase patterns (contextual review)",
                "Security scan integrated (OWASP Top 10 checks)",
                "Refactoring suggestions with diffs",
                "Supports 12 languages (JS, TS, Python, Go, Rust, etc.)",
            ],
            "Strong B2B SaaS potential. Developers will pay $20-50/month. But competition is fierce (GitHub Copilot, Cursor, others). Need a differentiation wedge.",
            false,
        ),
        idea(
            4,
            "SalesWhisper — Voice-to-CRM Automation",
            "Salespeople speak after calls, AI writes CRM notes, suggests follow-up actions, updates deal stages.",
            "B2B sales reps at 10-500 person companies using Salesforce/HubSpot",
            &[
                "Salesforce & HubSpot native integrations",
                "Call recording + transcription (Zoom, Meet, Teams)",
                "Automatic next-step suggestions",
                "Manager dashboard (deal quality scoring)",
            ],
            "Strong B2B play. Sales teams have budget. But build complexity is high (integrations are hard). Might take 6-12 months to ship.",
            false,
        ),
        idea(
            5,
            "ContractSafe AI — Startup Legal Review",
            "Upload contracts (NDAs, vendor agreements, leases), get AI review with risk flags and redline suggestions.",
            "Early-stage startups (pre-Series A) without in-house legal",
            &[
                "Trained on 100K+ startup contracts",
                "Identifies 'gotcha' clauses (IP assignment, unlimited liability)",
                "Lawyer marketplace for complex issues",
                "Template library (500+ startup-friendly contracts)",
            ],
            "Clear B2B SaaS. Startups will pay $100-300/month. But legal is a regulated space, and liability risk is high. May need to partner with law firms.",
            false,
        ),
    ]
}

const PROPOSAL: &[(&str, &str)] = &[
    (
        "1. Problem Statement",
        "Nurses spend 2+ hours per 12-hour shift (16% of their time) on documentation, reducing direct patient care. Current EMR systems require manual typing, don't understand medical terminology, and force tedious SOAP format entry. This documentation burden contributes to nurse burnout (53% report feeling overwhelmed by paperwork) and medical errors (poor documentation is cited in 40% of malpractice cases).",
    ),
    (
        "2. Target User Persona",
        "Sarah Chen, 32, RN at Urban General Hospital. Works three 12-hour shifts per week in med-surg. Spends 2.5 hours per shift on charting. Frustrated with Epic's clunky interface. Dreams of spending more time with patients. Tech-savvy (uses iPhone, Spotify, owns AirPods). Would pay out-of-pocket for tools that save time.",
    ),
    (
        "3. Current Alternatives & Their Weaknesses",
        "**Manual EMR Entry** (Epic, Cerner): Clunky, time-consuming, requires typing. **Dragon Medical** ($1,500/year): Expensive, requires training, poor at medical context. **Nuance PowerScribe** ($3,000/year): Radiology-focused, not for floor nurses. **Consumer voice apps** (Siri, Google): Not HIPAA-compliant, no medical vocabulary. **Our edge**: HIPAA-native, nurse-specific workflow, EMR integration, affordable ($50/month).",
    ),
    (
        "4. Unique Wedge (Why You Can Win)",
        "1. **Vertical focus**: Built exclusively for floor nurses (not doctors, not admins). 2. **SOAP-native**: Understands clinical documentation structure. 3. **Offline-first**: Works in hospital dead zones. 4. **EMR plugins**: Epic & Cerner integrations (not just 'export to PDF'). 5. **Clinical validation**: Partnered with 3 RN advisors from day 0. 6. **Pricing**: $50/month (vs. Dragon's $125/month), hospitals will reimburse.",
    ),
    (
        "5. MVP Scope (Must-Have Features Only)",
        "**Core Features**: Voice recording (60sec max), SOAP transcription (auto-format), basic medical terminology (1,000 terms), copy to clipboard (paste into EMR). **Not in MVP**: EMR integrations (Phase 2), ICD-10 suggestions (Phase 2), team sharing (Phase 3), offline mode (Phase 3). **Success metric**: 10 nurses use it daily for 2 weeks, save 30+ min per shift.",
    ),
    (
        "6. Key User Flows (3-5 Critical Paths)",
        "**Flow 1**: Nurse ends patient visit → Opens NurseNote app → Speaks notes for 45sec → Reviews SOAP output → Copies to EMR → Done (2min total). **Flow 2**: Nurse makes verbal error → Taps 'Redo' → Speaks correction → Updated instantly. **Flow 3**: Nurse unsure about term → App suggests 3 alternatives → Selects correct one. **Flow 4**: End of shift → Reviews 8 patient notes → Batch copy all to EMR. **Flow 5**: Onboarding → 60sec tutorial video → Records first practice note → Gets instant feedback.",
    ),
    (
        "7. Data & Model Plan (Optional: If AI-Heavy)",
        "**Model**: Fine-tuned Whisper Large v3 on 10K clinical voice samples (public datasets + synthetic). **Medical terms**: Custom vocabulary overlay (1,000 → 5,000 terms by launch). **SOAP formatting**: Rule-based post-processing (Subjective/Objective/Assessment/Plan structure). **Privacy**: On-device processing (no cloud) OR encrypted cloud with BAA. **Training data sources**: MIMIC-III notes (deidentified), synthetic data from clinical advisors, user opt-in feedback loop.",
    ),
    (
        "8. Go-to-Market (First 50 Users Strategy)",
        "**Week 1-2**: Recruit 3 nurse advisors (offer free lifetime access). **Week 3-4**: Ship TestFlight beta to advisors + their 10 colleagues (30 total nurses). **Week 5-6**: Nursing subreddits (r/nursing, 500K members) + Facebook groups (10 groups, 50K+ members). **Week 7-8**: Nurse influencer partnerships (TikTok: @nurselifern has 400K followers). **Week 9-10**: Hospital pilot at advisor's hospital (Urban General, 200 nurses). **Week 11-12**: YC application + ProductHunt launch. **Target**: 50 DAU by end of Month 3.",
    ),
    (
        "9. Risks & Mitigations",
        "**Technical Risk**: Whisper accuracy <90% → Mitigation: Medical term overlay + user corrections feedback loop. **Regulatory Risk**: HIPAA violation → Mitigation: Hire healthcare compliance consultant ($5K), get BAA from infrastructure providers. **Market Risk**: Nurses won't pay out-of-pocket → Mitigation: Offer hospital billing option, free tier with limits. **Competition Risk**: Epic/Cerner builds this → Mitigation: Move fast, own the nurse community, become the standard before they wake up. **Adoption Risk**: Nurses resistant to new tools → Mitigation: Dead simple onboarding (60sec), show time savings immediately.",
    ),
    (
        "10. 2-Week Roadmap (Daily Milestones)",
        "**Day 1-2**: Voice recording + playback (mobile app). **Day 3-4**: Whisper API integration (basic transcription). **Day 5-6**: SOAP formatting logic (rule-based). **Day 7**: Medical term overlays (top 100 terms). **Day 8-9**: Copy-to-clipboard + basic UI polish. **Day 10**: TestFlight build #1 → Send to 3 advisors. **Day 11**: Feedback incorporation (top 3 issues). **Day 12**: TestFlight build #2 → Send to 10 more nurses. **Day 13**: Onboarding tutorial video (record + edit). **Day 14**: ProductHunt post draft + landing page launch. **Checkpoint**: 10 nurses using daily by Day 14.",
    ),
];

/// The ten-section proposal, in reading order
pub fn proposal() -> Vec<ProposalSection> {
    PROPOSAL
        .iter()
        .map(|(title, content)| ProposalSection {
            title: (*title).to_string(),
            content: (*content).to_string(),
        })
        .collect()
}

const BUILD_LOGS: &[(&str, LogLevel, &str)] = &[
    ("12:45:01", LogLevel::Info, "⚙️  Scaffolding Next.js application..."),
    ("12:45:03", LogLevel::Success, "✅ Created pages/index.tsx"),
    ("12:45:03", LogLevel::Success, "✅ Created pages/dashboard.tsx"),
    ("12:45:03", LogLevel::Success, "✅ Created pages/record.tsx"),
    ("12:45:04", LogLevel::Info, "⚙️  Installing dependencies..."),
    ("12:45:12", LogLevel::Success, "✅ npm install complete (247 packages)"),
    ("12:45:13", LogLevel::Info, "⚙️  Configuring Tailwind CSS..."),
    ("12:45:14", LogLevel::Success, "✅ Tailwind configured"),
    ("12:45:14", LogLevel::Info, "⚙️  Setting up API routes..."),
    ("12:45:15", LogLevel::Success, "✅ Created /api/transcribe"),
    ("12:45:15", LogLevel::Success, "✅ Created /api/format-soap"),
    ("12:45:16", LogLevel::Info, "🚀 Starting development server..."),
    ("12:45:18", LogLevel::Success, "✅ Server running at http://localhost:3000"),
    ("12:45:18", LogLevel::Success, "🎉 Build complete! Opening browser..."),
];

/// Build log for the MVP, reported as complete
pub fn build_progress() -> BuildProgress {
    BuildProgress {
        logs: BUILD_LOGS
            .iter()
            .map(|(timestamp, level, message)| BuildLog {
                timestamp: (*timestamp).to_string(),
                level: *level,
                message: (*message).to_string(),
            })
            .collect(),
        progress: 100,
    }
}

fn passing_step(name: &str, screenshot: &str, checks: &[&str]) -> TestStep {
    TestStep {
        name: name.to_string(),
        status: StepStatus::Pass,
        screenshot: screenshot.to_string(),
        checks: strings(checks),
    }
}

/// Browser test run against the built MVP
pub fn test_report() -> TestReport {
    let steps = vec![
        passing_step(
            "Homepage Renders",
            "/screenshots/step1.svg",
            &[
                "Verified hero text: 'NurseNote AI'",
                "CTA button visible and clickable",
                "Hero image loaded (nurses-working.jpg)",
                "Navigation menu responsive",
            ],
        ),
        passing_step(
            "User Signup Flow",
            "/screenshots/step2.svg",
            &[
                "Form accepts valid email format",
                "Password requirements met (8+ chars, 1 number)",
                "Signup button enabled after validation",
                "Success message appears after submit",
            ],
        ),
        passing_step(
            "Voice Recording Feature",
            "/screenshots/step3.svg",
            &[
                "Microphone permission prompt appears",
                "Recording button changes to 'Stop' when active",
                "Waveform animation displays during recording",
                "Audio playback works after recording",
            ],
        ),
        passing_step(
            "SOAP Note Generation",
            "/screenshots/step4.svg",
            &[
                "Transcription appears within 3 seconds",
                "SOAP format applied (S/O/A/P sections visible)",
                "Copy button functional (clipboard API works)",
                "Character count displayed (247 characters)",
            ],
        ),
    ];

    let passed = steps.iter().filter(|s| s.status == StepStatus::Pass).count();
    let failed = steps.len() - passed;

    TestReport {
        passed: u32::try_from(passed).unwrap_or(u32::MAX),
        failed: u32::try_from(failed).unwrap_or(u32::MAX),
        execution_time: "42 seconds".to_string(),
        browser: "Chrome 120 (Isolated)".to_string(),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        assert_eq!(STATUS_LINES.len(), 10);
        assert_eq!(STATUS_LINES[0].delay_ms, 0);
        assert_eq!(STATUS_LINES.iter().map(|l| l.delay_ms).sum::<u64>(), 34_000);
    }

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(trends().len(), 5);
        assert_eq!(ideas().len(), 5);
        assert_eq!(proposal().len(), 10);
        assert_eq!(build_progress().logs.len(), 14);
        assert_eq!(test_report().steps.len(), 4);
    }

    #[test]
    fn test_report_counts_match_steps() {
        let report = test_report();
        assert_eq!(report.passed, 4);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_exactly_one_recommended_idea() {
        assert_eq!(ideas().iter().filter(|i| i.recommended).count(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let trend_ids: std::collections::HashSet<u32> = trends().iter().map(|t| t.id).collect();
        let idea_ids: std::collections::HashSet<u32> = ideas().iter().map(|i| i.id).collect();
        assert_eq!(trend_ids.len(), 5);
        assert_eq!(idea_ids.len(), 5);
    }
}
