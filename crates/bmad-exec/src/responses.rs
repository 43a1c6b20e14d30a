use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use bmad_core::MessageFormat;

/// Chooses one entry out of a pool of `len` canned responses.
pub trait ResponsePicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

#[derive(Debug)]
pub struct RandomPicker {
    rng: Mutex<StdRng>,
}

impl RandomPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl ResponsePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.lock().gen_range(0..len)
    }
}

/// Always returns the same index, clamped to the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl ResponsePicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatReply {
    ButtonComponent,
    OptimizationTips,
    GridExplanation,
}

impl ChatReply {
    pub const ALL: [ChatReply; 3] = [
        ChatReply::ButtonComponent,
        ChatReply::OptimizationTips,
        ChatReply::GridExplanation,
    ];

    pub fn format(self) -> MessageFormat {
        match self {
            Self::ButtonComponent => MessageFormat::Code,
            Self::OptimizationTips | Self::GridExplanation => MessageFormat::Text,
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            Self::ButtonComponent => {
                "// Here's a modern Button component\n\
import { cn } from '@/lib/utils'\n\
\n\
export function Button({ variant = 'default', children, ...props }) {\n  \
return (\n    \
<button\n      \
className={cn(\n        \
'px-4 py-2 rounded-lg font-medium transition-all',\n        \
variant === 'primary' && 'bg-primary text-primary-foreground',\n        \
variant === 'ghost' && 'bg-transparent hover:bg-muted'\n      \
)}\n      \
{...props}\n    \
>\n      \
{children}\n    \
</button>\n  \
)\n\
}"
            }
            Self::OptimizationTips => {
                "I've analyzed your code and here are my suggestions:\n\n\
1. **Use useMemo** for expensive computations\n\
2. **Add error boundaries** for better error handling\n\
3. **Implement lazy loading** for the heavy components\n\n\
Would you like me to implement any of these optimizations?"
            }
            Self::GridExplanation => {
                "Great question! This code creates a responsive grid layout using CSS Grid. \
The `grid-template-columns: repeat(auto-fit, minmax(300px, 1fr))` ensures cards \
automatically wrap and maintain a minimum width of 300px while expanding to fill \
available space."
            }
        }
    }

    pub fn pick(picker: &dyn ResponsePicker) -> Self {
        Self::ALL[picker.pick(Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSuggestion {
    ErrorHandling,
    LoadingState,
    Memoization,
}

impl CompletionSuggestion {
    pub const ALL: [CompletionSuggestion; 3] = [
        CompletionSuggestion::ErrorHandling,
        CompletionSuggestion::LoadingState,
        CompletionSuggestion::Memoization,
    ];

    /// Text appended to the active file on accept. Each entry starts with a
    /// blank line.
    pub fn content(self) -> &'static str {
        match self {
            Self::ErrorHandling => {
                "\n\n// AI Suggestion: Add error handling\ntry {\n  // Your code here\n} catch (error) {\n  console.error('Error:', error)\n}"
            }
            Self::LoadingState => {
                "\n\n// AI Suggestion: Add loading state\nconst [loading, setLoading] = useState(false)"
            }
            Self::Memoization => {
                "\n\n// AI Suggestion: Optimize with useMemo\nconst memoizedValue = useMemo(() => computeExpensiveValue(a, b), [a, b])"
            }
        }
    }

    pub fn pick(picker: &dyn ResponsePicker) -> Self {
        Self::ALL[picker.pick(Self::ALL.len())]
    }
}
